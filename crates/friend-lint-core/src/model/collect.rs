//! First pass: declarations.
//!
//! Walks every file once and records type declarations (with their friend
//! attributes, fields and variants), impl blocks (with their members) and
//! `use` imports. Nothing is resolved here; [`super::Program`] links names to ids once all
//! files have been seen.

use super::source::SourceFile;
use super::TypeKind;
use crate::context::FileContext;
use crate::types::Location;
use crate::utils::{friend_attrs, parse_friend_args, type_path_segments, FriendArg};
use syn::visit::Visit;
use syn::{
    Attribute, Field, Fields, FnArg, GenericArgument, ImplItem, ItemEnum, ItemImpl, ItemMod,
    ItemStruct, ItemUnion, ItemUse, PathArguments, ReturnType, Signature, Type, UseTree,
};

/// A type declaration awaiting id assignment.
#[derive(Debug, Clone)]
pub(crate) struct PendingType {
    pub name: String,
    pub module: Vec<String>,
    pub kind: TypeKind,
    pub location: Location,
    /// One entry per friend attribute, in attribute order.
    pub friend_attrs: Vec<Vec<FriendArg>>,
    pub fields: Vec<PendingField>,
    pub variants: Vec<String>,
}

/// A field with the path of its declared type, when it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingField {
    pub name: String,
    pub ty: Option<Vec<String>>,
}

/// One name brought into scope by a `use` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingImport {
    pub module: Vec<String>,
    pub kind: ImportKind,
    /// Full path for named imports, the prefix for globs.
    pub path: Vec<String>,
}

/// How an import binds names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImportKind {
    /// `use a::T;` or `use a::T as U;`, binding the alias.
    Named(String),
    /// `use a::*;`
    Glob,
}

/// An impl block awaiting self-type resolution.
#[derive(Debug, Clone)]
pub(crate) struct PendingImpl {
    pub self_path: Vec<String>,
    pub module: Vec<String>,
    pub members: Vec<PendingMember>,
}

/// A function declared in an impl block.
#[derive(Debug, Clone)]
pub(crate) struct PendingMember {
    pub name: String,
    pub has_receiver: bool,
    pub returns: ReturnShape,
}

/// What a function returns, relative to its impl's self type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReturnShape {
    /// `Self` or the self type itself.
    SelfType,
    /// A generic wrapper around it, e.g. `Result<Self, E>` or `Option<Self>`.
    Wrapped,
    /// Anything else.
    Other,
}

/// Everything collected from all files.
#[derive(Debug, Default)]
pub(crate) struct Declarations {
    pub types: Vec<PendingType>,
    pub impls: Vec<PendingImpl>,
    pub imports: Vec<PendingImport>,
}

/// Collects the declarations of one file into `out`.
pub(crate) fn collect(file: &SourceFile, attribute: &str, out: &mut Declarations) {
    let mut collector = DeclCollector {
        ctx: file.context(),
        attribute,
        module: file.module_path.clone(),
        out,
    };
    collector.visit_file(&file.ast);
}

struct DeclCollector<'a> {
    ctx: FileContext<'a>,
    attribute: &'a str,
    module: Vec<String>,
    out: &'a mut Declarations,
}

impl DeclCollector<'_> {
    fn push_type(
        &mut self,
        ident: &syn::Ident,
        attrs: &[Attribute],
        kind: TypeKind,
        fields: Vec<PendingField>,
        variants: Vec<String>,
    ) {
        let friend_attrs = friend_attrs(attrs, self.attribute)
            .map(parse_friend_args)
            .collect();

        self.out.types.push(PendingType {
            name: ident.to_string(),
            module: self.module.clone(),
            kind,
            location: self.ctx.location(ident.span()),
            friend_attrs,
            fields,
            variants,
        });
    }
}

impl<'ast> Visit<'ast> for DeclCollector<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        // `mod foo;` declarations are picked up through their own file.
        if node.content.is_none() {
            return;
        }
        self.module.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.module.pop();
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        let fields = pending_fields(&node.fields);
        self.push_type(&node.ident, &node.attrs, TypeKind::Struct, fields, Vec::new());
        syn::visit::visit_item_struct(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast ItemEnum) {
        let variants = node.variants.iter().map(|v| v.ident.to_string()).collect();
        self.push_type(&node.ident, &node.attrs, TypeKind::Enum, Vec::new(), variants);
        syn::visit::visit_item_enum(self, node);
    }

    fn visit_item_union(&mut self, node: &'ast ItemUnion) {
        let fields = node.fields.named.iter().filter_map(named_field).collect();
        self.push_type(&node.ident, &node.attrs, TypeKind::Union, fields, Vec::new());
        syn::visit::visit_item_union(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        if let Some(self_path) = type_path_segments(&node.self_ty) {
            let self_name = self_path.last().cloned().unwrap_or_default();
            let members = node
                .items
                .iter()
                .filter_map(|item| match item {
                    ImplItem::Fn(f) => Some(PendingMember {
                        name: f.sig.ident.to_string(),
                        has_receiver: has_receiver(&f.sig),
                        returns: return_shape(&f.sig.output, &self_name),
                    }),
                    _ => None,
                })
                .collect();

            self.out.impls.push(PendingImpl {
                self_path,
                module: self.module.clone(),
                members,
            });
        }
        syn::visit::visit_item_impl(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast ItemUse) {
        for (kind, path) in expand_use_tree(&node.tree, &[]) {
            self.out.imports.push(PendingImport {
                module: self.module.clone(),
                kind,
                path,
            });
        }
    }
}

/// Flattens a use tree into the names it binds.
///
/// `use a::{b::T, U as V, c::*, self as d};` yields `T -> a::b::T`,
/// `V -> a::U`, a glob over `a::c` and `d -> a`. `_` imports bind nothing.
fn expand_use_tree(tree: &UseTree, prefix: &[String]) -> Vec<(ImportKind, Vec<String>)> {
    let joined = |ident: &syn::Ident| {
        let mut path = prefix.to_vec();
        if ident != "self" {
            path.push(ident.to_string());
        }
        path
    };

    match tree {
        UseTree::Path(p) => expand_use_tree(&p.tree, &joined(&p.ident)),
        UseTree::Name(n) => {
            let path = joined(&n.ident);
            match path.last() {
                Some(alias) => vec![(ImportKind::Named(alias.clone()), path.clone())],
                None => Vec::new(),
            }
        }
        UseTree::Rename(r) if r.rename == "_" => Vec::new(),
        UseTree::Rename(r) => vec![(ImportKind::Named(r.rename.to_string()), joined(&r.ident))],
        UseTree::Glob(_) => vec![(ImportKind::Glob, prefix.to_vec())],
        UseTree::Group(g) => g
            .items
            .iter()
            .flat_map(|item| expand_use_tree(item, prefix))
            .collect(),
    }
}

fn named_field(field: &Field) -> Option<PendingField> {
    field.ident.as_ref().map(|ident| PendingField {
        name: ident.to_string(),
        ty: type_path_segments(&field.ty),
    })
}

fn pending_fields(fields: &Fields) -> Vec<PendingField> {
    match fields {
        Fields::Named(named) => named.named.iter().filter_map(named_field).collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(index, field)| PendingField {
                name: index.to_string(),
                ty: type_path_segments(&field.ty),
            })
            .collect(),
        Fields::Unit => Vec::new(),
    }
}

fn has_receiver(sig: &Signature) -> bool {
    matches!(sig.inputs.first(), Some(FnArg::Receiver(_)))
}

fn is_self_type(ty: &Type, self_name: &str) -> bool {
    type_path_segments(ty)
        .and_then(|segments| segments.last().cloned())
        .is_some_and(|last| last == "Self" || last == self_name)
}

fn return_shape(output: &ReturnType, self_name: &str) -> ReturnShape {
    let ReturnType::Type(_, ty) = output else {
        return ReturnShape::Other;
    };
    if is_self_type(ty, self_name) {
        return ReturnShape::SelfType;
    }

    // Result<Self, E>, Option<Self>, Box<Self>, Arc<Self>, ...
    if let Type::Path(p) = ty.as_ref() {
        if let Some(PathArguments::AngleBracketed(args)) =
            p.path.segments.last().map(|s| &s.arguments)
        {
            let wraps_self = args.args.iter().next().is_some_and(|arg| {
                matches!(arg, GenericArgument::Type(inner) if is_self_type(inner, self_name))
            });
            if wraps_self {
                return ReturnShape::Wrapped;
            }
        }
    }

    ReturnShape::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_str(path: &str, code: &str) -> Declarations {
        let file = SourceFile::parse(path, code).expect("valid source");
        let mut out = Declarations::default();
        collect(&file, "friend", &mut out);
        out
    }

    #[test]
    fn records_types_with_modules_and_attributes() {
        let decls = collect_str(
            "src/vault.rs",
            r#"
#[friend(Vault, severity = "warning")]
pub struct Secret { key: u64, pub label: String }

pub struct Vault(Secret);

mod inner {
    pub enum State { Open, Sealed(u8) }
}
"#,
        );

        let names: Vec<(&str, String)> = decls
            .types
            .iter()
            .map(|t| (t.name.as_str(), t.module.join("::")))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Secret", "crate::vault".to_string()),
                ("Vault", "crate::vault".to_string()),
                ("State", "crate::vault::inner".to_string()),
            ]
        );

        let secret = &decls.types[0];
        assert_eq!(secret.friend_attrs.len(), 1);
        let field_names: Vec<&str> = secret.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(field_names, vec!["key", "label"]);
        assert_eq!(secret.location.line, 3);
        assert_eq!(
            decls.types[1].fields,
            vec![PendingField {
                name: "0".to_string(),
                ty: Some(vec!["Secret".to_string()]),
            }]
        );
        assert_eq!(decls.types[2].variants, vec!["Open", "Sealed"]);
    }

    #[test]
    fn records_impl_members_and_return_shapes() {
        let decls = collect_str(
            "src/lib.rs",
            r#"
struct Secret;
impl Secret {
    fn new() -> Self { Secret }
    fn try_new() -> Result<Secret, String> { Ok(Secret) }
    fn reveal(&self) -> u64 { 0 }
}
impl Default for Secret {
    fn default() -> Self { Self::new() }
}
"#,
        );

        assert_eq!(decls.impls.len(), 2);
        let members: Vec<(&str, bool, ReturnShape)> = decls.impls[0]
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.has_receiver, m.returns))
            .collect();
        assert_eq!(
            members,
            vec![
                ("new", false, ReturnShape::SelfType),
                ("try_new", false, ReturnShape::Wrapped),
                ("reveal", true, ReturnShape::Other),
            ]
        );
        assert_eq!(decls.impls[1].self_path, vec!["Secret"]);
    }

    #[test]
    fn flattens_use_trees_per_module() {
        let decls = collect_str(
            "src/vault.rs",
            r"
use crate::secret::{Secret, Key as K, self as sec};
use super::shared::*;
use std::fmt::Write as _;

mod inner {
    use crate::a::Vault;
}
",
        );

        let imports: Vec<(String, ImportKind, String)> = decls
            .imports
            .iter()
            .map(|i| (i.module.join("::"), i.kind.clone(), i.path.join("::")))
            .collect();
        let named = |alias: &str| ImportKind::Named(alias.to_string());
        assert_eq!(
            imports,
            vec![
                ("crate::vault".to_string(), named("Secret"), "crate::secret::Secret".to_string()),
                ("crate::vault".to_string(), named("K"), "crate::secret::Key".to_string()),
                ("crate::vault".to_string(), named("sec"), "crate::secret".to_string()),
                ("crate::vault".to_string(), ImportKind::Glob, "super::shared".to_string()),
                ("crate::vault::inner".to_string(), named("Vault"), "crate::a::Vault".to_string()),
            ]
        );
    }
}
