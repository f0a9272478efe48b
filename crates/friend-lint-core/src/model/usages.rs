//! Second pass: usage sites.
//!
//! Walks every file with the linked [`Program`] at hand and records each
//! construction, associated-function call, method call and field access
//! whose owning type can be determined. The caller of a usage is the self
//! type of the innermost enclosing `impl` block; code in free functions,
//! trait default bodies and module-level items has no caller.
//!
//! There is no type inference. Receiver types are known for `self`, typed
//! parameters, `let x: T` bindings, bindings initialised from a struct
//! literal, a tuple-struct or variant constructor, or a function returning
//! `Self`, and reads of fields whose declared type is known. Method calls and
//! field reads on any other receiver are skipped, since the receiver may be
//! of a type outside the analyzed sources.
//!
//! Patterns are not usages: matching `State::Idle` neither constructs nor
//! reads a `State`.

use super::collect::ReturnShape;
use super::program::{Lookup, Program};
use super::source::SourceFile;
use super::{ConstructorResolution, TypeId, UsageKind, UsageSite};
use crate::context::FileContext;
use crate::utils::{path_segments, path_to_string, type_path_segments};
use std::collections::HashMap;
use syn::spanned::Spanned;
use syn::visit::Visit;
use syn::{
    Expr, ExprCall, ExprField, ExprMethodCall, ExprPath, ExprStruct, FnArg, ImplItemFn, ItemFn,
    ItemImpl, ItemMod, ItemTrait, Local, Member, Pat, Signature,
};

/// Collects the usage sites of one file.
pub(crate) fn collect(file: &SourceFile, program: &Program) -> Vec<UsageSite> {
    let mut collector = UsageCollector {
        ctx: file.context(),
        program,
        module: file.module_path.clone(),
        callers: Vec::new(),
        scopes: Vec::new(),
        usages: Vec::new(),
    };
    collector.visit_file(&file.ast);
    collector.usages
}

struct UsageCollector<'a> {
    ctx: FileContext<'a>,
    program: &'a Program,
    module: Vec<String>,
    /// Self types of enclosing impl blocks; `None` for containers that are
    /// not types (traits, impls of unknown types).
    callers: Vec<Option<TypeId>>,
    /// Known local bindings, one map per enclosing function.
    scopes: Vec<HashMap<String, TypeId>>,
    usages: Vec<UsageSite>,
}

impl UsageCollector<'_> {
    fn caller(&self) -> Option<TypeId> {
        self.callers.last().copied().flatten()
    }

    fn resolve(&self, segments: &[String]) -> Lookup {
        self.program
            .resolve_path(segments, &self.module, self.caller())
    }

    fn record(&mut self, kind: UsageKind, span: proc_macro2::Span) {
        self.usages
            .push(UsageSite::new(kind, self.caller(), self.ctx.location(span)));
    }

    fn bind(&mut self, name: String, ty: TypeId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, ty);
        }
    }

    fn local(&self, name: &str) -> Option<TypeId> {
        if name == "self" {
            return self.caller();
        }
        self.scopes.last().and_then(|scope| scope.get(name).copied())
    }

    /// Binds typed parameters of a function signature.
    fn bind_params(&mut self, sig: &Signature) {
        for input in &sig.inputs {
            let FnArg::Typed(arg) = input else { continue };
            if let (Pat::Ident(ident), Some(ty)) = (arg.pat.as_ref(), self.type_of(&arg.ty)) {
                self.bind(ident.ident.to_string(), ty);
            }
        }
    }

    fn type_of(&self, ty: &syn::Type) -> Option<TypeId> {
        match self.resolve(&type_path_segments(ty)?) {
            Lookup::Found(id) => Some(id),
            Lookup::Ambiguous | Lookup::Missing => None,
        }
    }

    /// Best-effort static type of an expression.
    fn infer(&self, expr: &Expr) -> Option<TypeId> {
        match expr {
            Expr::Path(p) if p.qself.is_none() => match p.path.get_ident() {
                Some(ident) => self.local(&ident.to_string()),
                None => self.constructed_by_path(&path_segments(&p.path)),
            },
            Expr::Paren(p) => self.infer(&p.expr),
            Expr::Group(g) => self.infer(&g.expr),
            Expr::Reference(r) => self.infer(&r.expr),
            Expr::Struct(s) if s.qself.is_none() => {
                self.constructed_by_path(&path_segments(&s.path))
            }
            Expr::Call(call) => self.call_result(call, false),
            Expr::Try(t) => match t.expr.as_ref() {
                Expr::Call(call) => self.call_result(call, true),
                _ => None,
            },
            Expr::Field(field) => {
                let base = self.infer(&field.base)?;
                self.program.field_type(base, &member_name(&field.member))
            }
            Expr::MethodCall(call) => {
                let recv = self.infer(&call.receiver)?;
                let member = self.program.member(recv, &call.method.to_string())?;
                (member.returns == ReturnShape::SelfType).then_some(recv)
            }
            _ => None,
        }
    }

    /// Type produced by `T`, `T { .. }` or `E::V` style paths.
    fn constructed_by_path(&self, segments: &[String]) -> Option<TypeId> {
        match self.resolve(segments) {
            Lookup::Found(id) => Some(id),
            Lookup::Ambiguous => None,
            Lookup::Missing => {
                let (variant, prefix) = segments.split_last()?;
                match self.resolve(prefix) {
                    Lookup::Found(id) if self.program.is_enum_variant(id, variant) => Some(id),
                    _ => None,
                }
            }
        }
    }

    /// Type produced by calling `func(..)`, looking through `?` when `tried`.
    fn call_result(&self, call: &ExprCall, tried: bool) -> Option<TypeId> {
        let Expr::Path(func) = call.func.as_ref() else {
            return None;
        };
        if func.qself.is_some() {
            return None;
        }
        let segments = path_segments(&func.path);
        if let Some(id) = self.constructed_by_path(&segments) {
            return Some(id);
        }

        let (name, prefix) = segments.split_last()?;
        let Lookup::Found(owner) = self.resolve(prefix) else {
            return None;
        };
        let returns = self.program.member(owner, name)?.returns;
        match returns {
            ReturnShape::SelfType => Some(owner),
            ReturnShape::Wrapped if tried => Some(owner),
            ReturnShape::Wrapped | ReturnShape::Other => None,
        }
    }

    /// Classifies a path used as a value or called as a function.
    ///
    /// `T(..)`, `T` and `E::V(..)` construct; `T::f(..)` invokes.
    fn path_usage(&self, segments: &[String]) -> Option<UsageKind> {
        let construction = |constructor| Some(UsageKind::Construction { constructor });

        match self.resolve(segments) {
            Lookup::Found(id) => return construction(ConstructorResolution::Resolved(id)),
            Lookup::Ambiguous => return construction(ConstructorResolution::Ambiguous),
            Lookup::Missing => {}
        }

        let (last, prefix) = segments.split_last()?;
        if prefix.is_empty() {
            return None;
        }
        match self.resolve(prefix) {
            Lookup::Found(id) if self.program.is_enum_variant(id, last) => {
                construction(ConstructorResolution::Resolved(id))
            }
            Lookup::Found(id) => Some(UsageKind::Invocation { owner: id }),
            Lookup::Ambiguous if starts_uppercase(last) => {
                construction(ConstructorResolution::Ambiguous)
            }
            Lookup::Ambiguous | Lookup::Missing => None,
        }
    }

    fn record_path(&mut self, path: &syn::Path) {
        let segments = path_segments(path);
        if let Some(kind) = self.path_usage(&segments) {
            let span = path
                .segments
                .last()
                .map_or_else(|| path.span(), |s| s.ident.span());
            self.record(kind, span);
        } else {
            tracing::trace!("Unobserved path `{}`", path_to_string(path));
        }
    }

    fn with_scope(&mut self, sig: &Signature, visit: impl FnOnce(&mut Self)) {
        self.scopes.push(HashMap::new());
        self.bind_params(sig);
        visit(self);
        self.scopes.pop();
    }
}

impl<'ast> Visit<'ast> for UsageCollector<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        if node.content.is_none() {
            return;
        }
        self.module.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.module.pop();
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        let self_ty = type_path_segments(&node.self_ty).and_then(|segments| {
            match self.program.resolve_path(&segments, &self.module, None) {
                Lookup::Found(id) => Some(id),
                Lookup::Ambiguous | Lookup::Missing => None,
            }
        });
        let scopes = std::mem::take(&mut self.scopes);
        self.callers.push(self_ty);
        syn::visit::visit_item_impl(self, node);
        self.callers.pop();
        self.scopes = scopes;
    }

    fn visit_item_trait(&mut self, node: &'ast ItemTrait) {
        let scopes = std::mem::take(&mut self.scopes);
        self.callers.push(None);
        syn::visit::visit_item_trait(self, node);
        self.callers.pop();
        self.scopes = scopes;
    }

    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.with_scope(&node.sig, |this| syn::visit::visit_item_fn(this, node));
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        self.with_scope(&node.sig, |this| syn::visit::visit_impl_item_fn(this, node));
    }

    fn visit_local(&mut self, node: &'ast Local) {
        syn::visit::visit_local(self, node);

        let (name, declared) = match &node.pat {
            Pat::Ident(ident) => (ident.ident.to_string(), None),
            Pat::Type(typed) => match typed.pat.as_ref() {
                Pat::Ident(ident) => (ident.ident.to_string(), self.type_of(&typed.ty)),
                _ => return,
            },
            _ => return,
        };
        let inferred = declared.or_else(|| {
            node.init
                .as_ref()
                .and_then(|init| self.infer(&init.expr))
        });
        if let Some(ty) = inferred {
            self.bind(name, ty);
        } else if let Some(scope) = self.scopes.last_mut() {
            // Shadowed by something we cannot type.
            scope.remove(&name);
        }
    }

    fn visit_expr_struct(&mut self, node: &'ast ExprStruct) {
        let constructor = if node.qself.is_some() {
            ConstructorResolution::Unresolved
        } else {
            let segments = path_segments(&node.path);
            match self.resolve(&segments) {
                Lookup::Found(id) => ConstructorResolution::Resolved(id),
                Lookup::Ambiguous => ConstructorResolution::Ambiguous,
                Lookup::Missing => match segments.split_last() {
                    Some((variant, prefix)) if !prefix.is_empty() => match self.resolve(prefix) {
                        Lookup::Found(id) if self.program.is_enum_variant(id, variant) => {
                            ConstructorResolution::Resolved(id)
                        }
                        Lookup::Ambiguous => ConstructorResolution::Ambiguous,
                        Lookup::Found(_) | Lookup::Missing => ConstructorResolution::Unresolved,
                    },
                    _ => ConstructorResolution::Unresolved,
                },
            }
        };
        let span = node
            .path
            .segments
            .last()
            .map_or_else(|| node.path.span(), |s| s.ident.span());
        self.record(UsageKind::Construction { constructor }, span);
        syn::visit::visit_expr_struct(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        match node.func.as_ref() {
            Expr::Path(func) if func.qself.is_none() => {
                self.record_path(&func.path);
                for attr in &node.attrs {
                    self.visit_attribute(attr);
                }
                for arg in &node.args {
                    self.visit_expr(arg);
                }
            }
            _ => syn::visit::visit_expr_call(self, node),
        }
    }

    fn visit_expr_path(&mut self, node: &'ast ExprPath) {
        // Single identifiers are locals, functions or unit structs.
        if node.qself.is_none() && node.path.get_ident().map_or(true, |i| i != "self") {
            let is_local = node
                .path
                .get_ident()
                .is_some_and(|i| self.local(&i.to_string()).is_some());
            if !is_local {
                self.record_path(&node.path);
            }
        }
        syn::visit::visit_expr_path(self, node);
    }

    fn visit_pat(&mut self, node: &'ast Pat) {
        // `Pat::Path` is an `ExprPath`; don't let it reach `visit_expr_path`.
        if let Pat::Path(_) = node {
            return;
        }
        syn::visit::visit_pat(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        let name = node.method.to_string();
        let owner = self
            .infer(&node.receiver)
            .filter(|recv| self.program.declares_method(*recv, &name));
        if let Some(owner) = owner {
            self.record(UsageKind::MethodCall { owner }, node.method.span());
        }
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_field(&mut self, node: &'ast ExprField) {
        let name = member_name(&node.member);
        let owner = self
            .infer(&node.base)
            .filter(|base| self.program.declares_field(*base, &name));
        if let Some(owner) = owner {
            self.record(UsageKind::FieldRead { owner }, node.member.span());
        }
        syn::visit::visit_expr_field(self, node);
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn member_name(member: &Member) -> String {
    match member {
        Member::Named(ident) => ident.to_string(),
        Member::Unnamed(index) => index.index.to_string(),
    }
}
