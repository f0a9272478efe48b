//! Target and caller resolution for usage sites.

use crate::model::{ConstructorResolution, TypeId, UsageKind, UsageSite};

/// Returns the type whose member or constructor `usage` refers to.
///
/// Member accesses resolve to the declaring type. Constructions resolve to
/// the type owning the selected constructor, or `None` when the host could
/// not select one. Other operations are not observed.
#[must_use]
pub fn classify(usage: &UsageSite) -> Option<TypeId> {
    match usage.kind {
        UsageKind::MethodCall { owner }
        | UsageKind::Invocation { owner }
        | UsageKind::FieldRead { owner }
        | UsageKind::PropertyRead { owner } => Some(owner),
        UsageKind::Construction { constructor } => match constructor {
            ConstructorResolution::Resolved(owner) => Some(owner),
            ConstructorResolution::Ambiguous | ConstructorResolution::Unresolved => None,
        },
        UsageKind::Other => None,
    }
}

/// Returns the type lexically enclosing `usage`, if any.
#[must_use]
pub fn caller(usage: &UsageSite) -> Option<TypeId> {
    usage.caller
}
