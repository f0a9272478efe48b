//! Semantic model consumed by rules.
//!
//! The model is the host's view of a program: declared types with stable
//! identities, the restriction annotations attached to them, and the usage
//! sites (constructions, calls, member reads) found in code. Rules only read
//! it through [`SemanticModel`].
//!
//! [`Program`] is the built-in model, constructed from Rust sources with
//! `syn`:
//!
//! ```text
//! SourceFile(s)
//!   ↓ collect   (declarations, impl blocks, #[friend] attributes)
//! Program tables
//!   ↓ usages    (constructions, invocations, method calls, field reads)
//! Program
//! ```

mod collect;
mod program;
mod source;
mod usages;

pub use program::Program;
pub use source::SourceFile;

use crate::annotation::RawAnnotation;
use crate::types::Location;
use serde::{Deserialize, Serialize};

/// Stable identity of a declared type.
///
/// Identities are compared by value and never by display name: two types
/// named `Config` in different modules get different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    /// Creates an id from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value, usable as a dense index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// `struct`
    Struct,
    /// `enum`
    Enum,
    /// `union`
    Union,
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSymbol {
    /// Identity.
    pub id: TypeId,
    /// Display name (the bare identifier).
    pub name: String,
    /// Module path the type is declared in (e.g. `["crate", "vault"]`).
    pub module: Vec<String>,
    /// Kind of declaration.
    pub kind: TypeKind,
    /// Location of the type's identifier.
    pub location: Location,
}

impl TypeSymbol {
    /// Fully qualified name, e.g. `crate::vault::Secret`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let mut parts = self.module.clone();
        parts.push(self.name.clone());
        parts.join("::")
    }
}

/// How the host resolved the constructor of a construction site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructorResolution {
    /// The constructor belongs to this type.
    Resolved(TypeId),
    /// Several types matched.
    Ambiguous,
    /// No known type matched.
    Unresolved,
}

/// What a usage site does, with its resolved member owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UsageKind {
    /// Object construction.
    Construction {
        /// Constructor selected by the host.
        constructor: ConstructorResolution,
    },
    /// Method call through a receiver.
    MethodCall {
        /// Type declaring the method.
        owner: TypeId,
    },
    /// Call of an associated function through a type path.
    Invocation {
        /// Type declaring the function.
        owner: TypeId,
    },
    /// Field read.
    FieldRead {
        /// Type declaring the field.
        owner: TypeId,
    },
    /// Property read, for hosts whose languages have properties.
    PropertyRead {
        /// Type declaring the property.
        owner: TypeId,
    },
    /// Anything the friend rule does not observe.
    Other,
}

/// One occurrence of a construction, call, or member read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSite {
    /// Operation and resolved owner.
    pub kind: UsageKind,
    /// Type lexically enclosing the usage; `None` outside any type body.
    pub caller: Option<TypeId>,
    /// Source position of the usage.
    pub location: Location,
}

impl UsageSite {
    /// Creates a usage site.
    #[must_use]
    pub fn new(kind: UsageKind, caller: Option<TypeId>, location: Location) -> Self {
        Self {
            kind,
            caller,
            location,
        }
    }
}

/// Read-only view of a program's types and usages.
///
/// Implementations must be shareable across the worker threads evaluating
/// one pass.
pub trait SemanticModel: Sync {
    /// Looks up a declared type.
    fn symbol(&self, id: TypeId) -> Option<&TypeSymbol>;

    /// Restriction annotations attached to `id`, in attribute order.
    fn annotations(&self, id: TypeId) -> &[RawAnnotation];

    /// All usage sites of the program.
    fn usages(&self) -> &[UsageSite];

    /// Display name of `id`, falling back to the debug form of the id.
    fn display_name(&self, id: TypeId) -> String {
        self.symbol(id)
            .map_or_else(|| format!("{id:?}"), |s| s.name.clone())
    }
}
