//! # friend-lint-macros
//!
//! Procedural macros for friend-lint.
//!
//! - `#[friend(...)]` marks a type as restricted. It is inert at compile
//!   time: the item is emitted unchanged and the list is read by the
//!   analyzer.
//! - `check!()` generates a `#[test]` that runs the analyzer over the
//!   workspace.

#![forbid(unsafe_code)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Expr, Item, Lit, MetaNameValue, Token};

/// Restricts construction, method calls and field reads of a type to the
/// listed friend types.
///
/// ```rust,ignore
/// #[friend_lint::friend(Vault)]
/// pub struct Secret { key: [u8; 32] }
///
/// #[friend_lint::friend(Loader, severity = "warning")]
/// pub struct Config { level: u8 }
/// ```
///
/// Arguments are not checked here; names that do not resolve to a type
/// are ignored by the analyzer.
#[proc_macro_attribute]
pub fn friend(_args: TokenStream, item: TokenStream) -> TokenStream {
    let tokens = TokenStream2::from(item.clone());
    match syn::parse::<Item>(item) {
        Ok(Item::Struct(_) | Item::Enum(_) | Item::Union(_)) => tokens.into(),
        Ok(_) => syn::Error::new_spanned(
            tokens,
            "#[friend] can only be applied to structs, enums and unions",
        )
        .to_compile_error()
        .into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Generates a test that fails when friend-lint reports findings.
///
/// ```rust,ignore
/// // tests/friends.rs
/// friend_lint::check!();
/// friend_lint::check!(config = "friend-lint.toml", fail_on = "warning");
/// ```
///
/// `config` is relative to the workspace root. `fail_on` overrides the
/// config file's threshold (default `"error"`).
#[proc_macro]
pub fn check(input: TokenStream) -> TokenStream {
    match expand_check(input.into()) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand_check(input: TokenStream2) -> syn::Result<TokenStream2> {
    let args = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse2(input)?;

    let mut config = None;
    let mut fail_on = None;
    for arg in &args {
        let value = string_value(&arg.value)?;
        if arg.path.is_ident("config") {
            config = Some(value);
        } else if arg.path.is_ident("fail_on") {
            fail_on = Some(value);
        } else {
            return Err(syn::Error::new_spanned(
                &arg.path,
                "unknown argument; expected `config` or `fail_on`",
            ));
        }
    }

    let config = optional(config);
    let fail_on = optional(fail_on);
    Ok(quote! {
        #[test]
        fn friend_lint_check() {
            ::friend_lint::__internal::run_check(#config, #fail_on);
        }
    })
}

fn string_value(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.value()),
            _ => Err(syn::Error::new_spanned(expr, "expected a string literal")),
        },
        _ => Err(syn::Error::new_spanned(expr, "expected a string literal")),
    }
}

fn optional(value: Option<String>) -> TokenStream2 {
    match value {
        Some(v) => quote!(::core::option::Option::Some(#v)),
        None => quote!(::core::option::Option::None),
    }
}
