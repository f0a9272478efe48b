//! The syn-built semantic model.

use super::collect::{self, Declarations, ImportKind, PendingField, PendingType, ReturnShape};
use super::source::SourceFile;
use super::usages;
use super::{SemanticModel, TypeId, TypeKind, TypeSymbol, UsageSite};
use crate::annotation::{AnnotationArg, RawAnnotation};
use crate::utils::FriendArg;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Result of looking a path up among declared types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    Found(TypeId),
    Ambiguous,
    Missing,
}

/// Longest chain of `use` re-exports followed while resolving one path.
const MAX_IMPORT_HOPS: usize = 8;

/// A function declared in some impl block of a type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MemberInfo {
    pub has_receiver: bool,
    pub returns: ReturnShape,
}

/// Everything known about one declared type.
#[derive(Debug, Clone)]
pub(crate) struct TypeDecl {
    pub symbol: TypeSymbol,
    pub annotations: Vec<RawAnnotation>,
    /// Field name to the declared type of the field, when that is known.
    pub fields: BTreeMap<String, Option<TypeId>>,
    pub variants: BTreeSet<String>,
    pub members: BTreeMap<String, MemberInfo>,
}

impl TypeDecl {
    fn full_path(&self) -> Vec<String> {
        let mut path = self.symbol.module.clone();
        path.push(self.symbol.name.clone());
        path
    }
}

/// Names a module brings into scope with `use`.
#[derive(Debug, Clone, Default)]
struct ModuleImports {
    named: HashMap<String, Vec<String>>,
    globs: Vec<Vec<String>>,
}

/// Semantic model of a set of Rust source files.
///
/// Built in two steps: declarations from every file are collected and
/// linked (ids assigned, imports recorded, friend names, impl self types and
/// field types resolved), then every file is walked again for usage sites.
#[derive(Debug, Default)]
pub struct Program {
    types: Vec<TypeDecl>,
    by_name: HashMap<String, Vec<TypeId>>,
    imports: HashMap<Vec<String>, ModuleImports>,
    usages: Vec<UsageSite>,
    files: usize,
}

impl Program {
    /// Builds the model of `files`, recognising friend attributes named
    /// `attribute`.
    ///
    /// Type ids follow file order, then source order, so the same inputs in
    /// the same order always get the same ids.
    #[must_use]
    pub fn build(files: &[SourceFile], attribute: &str) -> Self {
        let mut decls = Declarations::default();
        for file in files {
            collect::collect(file, attribute, &mut decls);
        }

        let mut program = Self::link(decls);
        let sites: Vec<UsageSite> = files
            .iter()
            .flat_map(|file| usages::collect(file, &program))
            .collect();
        program.usages = sites;
        program.files = files.len();

        debug!(
            "Built program: {} file(s), {} type(s), {} usage site(s)",
            program.files,
            program.types.len(),
            program.usages.len()
        );
        program
    }

    fn link(decls: Declarations) -> Self {
        let mut program = Self::default();
        let mut pending_attrs = Vec::with_capacity(decls.types.len());
        let mut pending_fields = Vec::with_capacity(decls.types.len());

        for (index, pending) in decls.types.into_iter().enumerate() {
            let id = TypeId::new(u32::try_from(index).unwrap_or(u32::MAX));
            let PendingType {
                name,
                module,
                kind,
                location,
                friend_attrs,
                fields,
                variants,
            } = pending;

            program.by_name.entry(name.clone()).or_default().push(id);
            pending_attrs.push(friend_attrs);
            pending_fields.push(fields);
            program.types.push(TypeDecl {
                symbol: TypeSymbol {
                    id,
                    name,
                    module,
                    kind,
                    location,
                },
                annotations: Vec::new(),
                fields: BTreeMap::new(),
                variants: variants.into_iter().collect(),
                members: BTreeMap::new(),
            });
        }

        for import in decls.imports {
            let scope = program.imports.entry(import.module).or_default();
            match import.kind {
                // The first import of a name wins; rustc rejects duplicates.
                ImportKind::Named(alias) => {
                    scope.named.entry(alias).or_insert(import.path);
                }
                ImportKind::Glob => scope.globs.push(import.path),
            }
        }

        // Friend names resolve relative to the annotated type's module.
        for (index, attrs) in pending_attrs.into_iter().enumerate() {
            let module = program.types[index].symbol.module.clone();
            let annotations = attrs
                .into_iter()
                .map(|args| {
                    RawAnnotation::new(
                        args.into_iter()
                            .map(|arg| program.resolve_friend_arg(arg, &module))
                            .collect(),
                    )
                })
                .collect();
            program.types[index].annotations = annotations;
        }

        for imp in decls.impls {
            match program.resolve_path(&imp.self_path, &imp.module, None) {
                Lookup::Found(id) => {
                    let members = &mut program.types[id.index()].members;
                    for member in imp.members {
                        members.entry(member.name).or_insert(MemberInfo {
                            has_receiver: member.has_receiver,
                            returns: member.returns,
                        });
                    }
                }
                lookup => debug!(
                    "Skipping impl for `{}`: {:?}",
                    imp.self_path.join("::"),
                    lookup
                ),
            }
        }

        for (index, fields) in pending_fields.into_iter().enumerate() {
            let module = program.types[index].symbol.module.clone();
            let resolved = fields
                .into_iter()
                .map(|PendingField { name, ty }| {
                    let ty = ty.and_then(|path| match program.resolve_path(&path, &module, None) {
                        Lookup::Found(id) => Some(id),
                        Lookup::Ambiguous | Lookup::Missing => None,
                    });
                    (name, ty)
                })
                .collect();
            program.types[index].fields = resolved;
        }

        program
    }

    fn resolve_friend_arg(&self, arg: FriendArg, module: &[String]) -> AnnotationArg {
        match arg {
            FriendArg::TypePath(segments) => match self.resolve_path(&segments, module, None) {
                Lookup::Found(id) => AnnotationArg::Type(id),
                lookup => {
                    debug!("Friend `{}` not resolved: {:?}", segments.join("::"), lookup);
                    AnnotationArg::Other(segments.join("::"))
                }
            },
            FriendArg::Severity(severity) => AnnotationArg::Severity(severity),
            FriendArg::Other(text) => AnnotationArg::Other(text),
        }
    }

    /// Resolves a path to a declared type.
    ///
    /// - `Self` resolves to `self_ty`.
    /// - A leading name imported into `module` with `use` is replaced by the
    ///   imported path. An import of an undeclared (external) item therefore
    ///   resolves to nothing, even if a declared type shares its name.
    /// - A bare name prefers a type declared in `module`, then an import,
    ///   then a unique match among glob imports, then a unique type of that
    ///   name anywhere.
    /// - `crate::a::T` must match exactly, or name a `use` re-export in
    ///   `crate::a`; `self::`/`super::` are relative to `module`; other
    ///   qualified paths match as a suffix.
    pub(crate) fn resolve_path(
        &self,
        segments: &[String],
        module: &[String],
        self_ty: Option<TypeId>,
    ) -> Lookup {
        self.resolve_in(segments, module, self_ty, 0)
    }

    fn resolve_in(
        &self,
        segments: &[String],
        module: &[String],
        self_ty: Option<TypeId>,
        hops: usize,
    ) -> Lookup {
        let Some((first, rest)) = segments.split_first() else {
            return Lookup::Missing;
        };
        if segments.len() == 1 && first == "Self" {
            return self_ty.map_or(Lookup::Missing, Lookup::Found);
        }

        if segments.len() == 1 {
            if let Some(id) = self.declared_in(first, module) {
                return Lookup::Found(id);
            }
        }

        if hops < MAX_IMPORT_HOPS {
            if let Some(target) = self.imported(module, first) {
                let mut path = target.clone();
                path.extend(rest.iter().cloned());
                return self.resolve_in(&path, module, self_ty, hops + 1);
            }
        }

        let Some(last) = segments.last() else {
            return Lookup::Missing;
        };

        if segments.len() == 1 {
            if hops < MAX_IMPORT_HOPS {
                if let Some(found) = self.through_globs(last, module, hops) {
                    return Lookup::Found(found);
                }
            }
            return match self.by_name.get(last).map(Vec::as_slice) {
                None | Some([]) => Lookup::Missing,
                Some([id]) => Lookup::Found(*id),
                Some(_) => Lookup::Ambiguous,
            };
        }

        let wanted = absolutize(segments, module);
        let exact = wanted.first().is_some_and(|s| s == "crate");
        let matches: Vec<TypeId> = self
            .by_name
            .get(last)
            .into_iter()
            .flatten()
            .copied()
            .filter(|id| {
                let full = self.types[id.index()].full_path();
                if exact {
                    full == wanted
                } else {
                    full.ends_with(&wanted)
                }
            })
            .collect();

        match matches.as_slice() {
            [] if exact && hops < MAX_IMPORT_HOPS => {
                // `crate::a::T` where `a` re-exports `T`.
                let Some((name, owner)) = wanted.split_last() else {
                    return Lookup::Missing;
                };
                match self.imported(owner, name) {
                    Some(target) => self.resolve_in(target, owner, None, hops + 1),
                    None => Lookup::Missing,
                }
            }
            [] => Lookup::Missing,
            [id] => Lookup::Found(*id),
            _ => Lookup::Ambiguous,
        }
    }

    /// The type named `name` declared directly in `module`.
    fn declared_in(&self, name: &str, module: &[String]) -> Option<TypeId> {
        self.by_name
            .get(name)?
            .iter()
            .copied()
            .find(|id| self.types[id.index()].symbol.module == module)
    }

    fn imported(&self, module: &[String], name: &str) -> Option<&Vec<String>> {
        self.imports.get(module)?.named.get(name)
    }

    /// The only type named `name` reachable through the glob imports of
    /// `module`.
    fn through_globs(&self, name: &str, module: &[String], hops: usize) -> Option<TypeId> {
        let globs = &self.imports.get(module)?.globs;
        let mut found = BTreeSet::new();
        for prefix in globs {
            let mut path = prefix.clone();
            path.push(name.to_string());
            if let Lookup::Found(id) = self.resolve_in(&path, module, None, hops + 1) {
                found.insert(id);
            }
        }
        match found.len() {
            1 => found.into_iter().next(),
            _ => None,
        }
    }

    pub(crate) fn decl(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.index())
    }

    pub(crate) fn is_enum_variant(&self, id: TypeId, variant: &str) -> bool {
        self.decl(id)
            .is_some_and(|d| d.symbol.kind == TypeKind::Enum && d.variants.contains(variant))
    }

    pub(crate) fn member(&self, id: TypeId, name: &str) -> Option<MemberInfo> {
        self.decl(id).and_then(|d| d.members.get(name).copied())
    }

    pub(crate) fn declares_method(&self, id: TypeId, name: &str) -> bool {
        self.member(id, name).is_some_and(|m| m.has_receiver)
    }

    pub(crate) fn declares_field(&self, id: TypeId, name: &str) -> bool {
        self.decl(id).is_some_and(|d| d.fields.contains_key(name))
    }

    /// Declared type of field `name` of `id`, if it is a declared type.
    pub(crate) fn field_type(&self, id: TypeId, name: &str) -> Option<TypeId> {
        self.decl(id).and_then(|d| d.fields.get(name).copied().flatten())
    }

    /// All declared types, in id order.
    pub fn types(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.types.iter().map(|d| &d.symbol)
    }

    /// Finds a type by bare name (`Secret`) or path (`crate::vault::Secret`).
    ///
    /// Returns `None` when the name is unknown or ambiguous.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<TypeId> {
        let segments: Vec<String> = path.split("::").map(String::from).collect();
        match self.resolve_path(&segments, &[], None) {
            Lookup::Found(id) => Some(id),
            Lookup::Ambiguous | Lookup::Missing => None,
        }
    }

    /// Number of source files the model was built from.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files
    }
}

impl SemanticModel for Program {
    fn symbol(&self, id: TypeId) -> Option<&TypeSymbol> {
        self.decl(id).map(|d| &d.symbol)
    }

    fn annotations(&self, id: TypeId) -> &[RawAnnotation] {
        self.decl(id)
            .map(|d| d.annotations.as_slice())
            .unwrap_or_default()
    }

    fn usages(&self) -> &[UsageSite] {
        &self.usages
    }
}

/// Rewrites leading `self`/`super` segments against `module`.
fn absolutize(segments: &[String], module: &[String]) -> Vec<String> {
    let mut base: Vec<String> = module.to_vec();
    let mut rest = segments;
    let mut relative = false;

    while let Some((head, tail)) = rest.split_first() {
        match head.as_str() {
            "self" => relative = true,
            "super" => {
                relative = true;
                base.pop();
            }
            _ => break,
        }
        rest = tail;
    }

    if relative {
        base.extend(rest.iter().cloned());
        base
    } else {
        segments.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(files: &[(&str, &str)]) -> Program {
        let files: Vec<SourceFile> = files
            .iter()
            .map(|(path, code)| SourceFile::parse(*path, *code).expect("valid source"))
            .collect();
        Program::build(&files, "friend")
    }

    fn segs(path: &str) -> Vec<String> {
        path.split("::").map(String::from).collect()
    }

    #[test]
    fn same_name_in_two_modules_gets_two_ids() {
        let p = program(&[
            ("src/a.rs", "pub struct Config;"),
            ("src/b.rs", "pub struct Config;"),
        ]);
        let ids: Vec<TypeId> = p.types().map(|t| t.id).collect();
        assert_eq!(ids, vec![TypeId::new(0), TypeId::new(1)]);

        assert_eq!(p.find("Config"), None);
        assert_eq!(p.find("crate::a::Config"), Some(TypeId::new(0)));
        assert_eq!(p.find("b::Config"), Some(TypeId::new(1)));
    }

    #[test]
    fn bare_names_prefer_the_local_module() {
        let p = program(&[
            ("src/a.rs", "pub struct Config;"),
            ("src/b.rs", "pub struct Config;"),
        ]);
        let module = segs("crate::b");
        assert_eq!(
            p.resolve_path(&segs("Config"), &module, None),
            Lookup::Found(TypeId::new(1))
        );
        assert_eq!(
            p.resolve_path(&segs("Config"), &segs("crate::c"), None),
            Lookup::Ambiguous
        );
        assert_eq!(
            p.resolve_path(&segs("super::a::Config"), &module, None),
            Lookup::Found(TypeId::new(0))
        );
        assert_eq!(
            p.resolve_path(&segs("Self"), &module, Some(TypeId::new(1))),
            Lookup::Found(TypeId::new(1))
        );
        assert_eq!(p.resolve_path(&segs("Missing"), &module, None), Lookup::Missing);
    }

    #[test]
    fn friend_names_resolve_to_ids() {
        let p = program(&[
            (
                "src/secret.rs",
                r#"#[friend(Vault, Nowhere, severity = "warning")] pub struct Secret;"#,
            ),
            ("src/vault.rs", "pub struct Vault;"),
        ]);
        let secret = p.find("Secret").expect("declared");
        let vault = p.find("Vault").expect("declared");

        let annotations = p.annotations(secret);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].args[0], AnnotationArg::Type(vault));
        assert_eq!(
            annotations[0].args[1],
            AnnotationArg::Other("Nowhere".to_string())
        );
        assert!(p.annotations(vault).is_empty());
    }

    #[test]
    fn impl_members_attach_to_their_type() {
        let p = program(&[(
            "src/lib.rs",
            r"
struct Config;
impl Config { fn get(&self) -> u8 { 0 } fn load() -> Self { Config } }
struct Other;
impl Other { fn get(&self) -> u8 { 1 } fn only_here(&self) {} }
",
        )]);
        let config = p.find("Config").expect("declared");
        let other = p.find("Other").expect("declared");

        assert!(p.declares_method(config, "get"));
        assert!(!p.declares_method(config, "load"));
        assert!(p.declares_method(other, "only_here"));
        assert!(!p.declares_method(config, "only_here"));
    }

    #[test]
    fn imported_names_resolve_to_the_imported_type() {
        let p = program(&[
            ("src/a.rs", "pub struct Vault;"),
            ("src/b.rs", "pub struct Vault;"),
            (
                "src/secret.rs",
                r"
use crate::a::Vault;
use crate::b::Vault as OtherVault;
use crate::b as bee;
use std::collections::HashMap;
",
            ),
            ("src/c.rs", "pub struct HashMap;"),
        ]);
        let a_vault = p.find("crate::a::Vault").expect("declared");
        let b_vault = p.find("crate::b::Vault").expect("declared");
        let module = segs("crate::secret");

        assert_eq!(
            p.resolve_path(&segs("Vault"), &module, None),
            Lookup::Found(a_vault)
        );
        assert_eq!(
            p.resolve_path(&segs("OtherVault"), &module, None),
            Lookup::Found(b_vault)
        );
        assert_eq!(
            p.resolve_path(&segs("bee::Vault"), &module, None),
            Lookup::Found(b_vault)
        );
        // Imported from outside the analyzed sources.
        assert_eq!(
            p.resolve_path(&segs("HashMap"), &module, None),
            Lookup::Missing
        );
    }

    #[test]
    fn re_exports_and_globs_are_followed() {
        let p = program(&[
            ("src/lib.rs", "pub mod secret;\npub use secret::Secret;"),
            ("src/secret.rs", "pub struct Secret;"),
            ("src/other.rs", "pub struct Secret;"),
            ("src/user.rs", "use crate::secret::*;"),
        ]);
        let secret = p.find("crate::secret::Secret").expect("declared");

        assert_eq!(
            p.resolve_path(&segs("crate::Secret"), &segs("crate::other"), None),
            Lookup::Found(secret)
        );
        assert_eq!(
            p.resolve_path(&segs("Secret"), &segs("crate::user"), None),
            Lookup::Found(secret)
        );
    }

    #[test]
    fn field_types_are_resolved() {
        let p = program(&[(
            "src/lib.rs",
            "struct Key; struct Vault { key: Key, count: u8 } struct Pair(Key, u8);",
        )]);
        let key = p.find("Key").expect("declared");
        let vault = p.find("Vault").expect("declared");
        let pair = p.find("Pair").expect("declared");

        assert_eq!(p.field_type(vault, "key"), Some(key));
        assert_eq!(p.field_type(vault, "count"), None);
        assert!(p.declares_field(vault, "count"));
        assert_eq!(p.field_type(pair, "0"), Some(key));
    }
}
