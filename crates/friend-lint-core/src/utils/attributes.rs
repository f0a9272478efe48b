//! Parsing of `#[friend(...)]` attributes.

use crate::annotation::SeverityArg;
use crate::types::Severity;
use crate::utils::paths::path_segments;
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Lit, Meta, Token};

/// An attribute argument before type names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendArg {
    /// A path naming a friend type, e.g. `Vault` or `crate::vault::Vault`.
    TypePath(Vec<String>),
    /// A `severity = ...` argument.
    Severity(SeverityArg),
    /// Anything else, as source text.
    Other(String),
}

/// Returns the attributes whose last path segment is `name`.
///
/// Matching the last segment accepts both `#[friend(..)]` and
/// `#[friend_lint::friend(..)]`.
pub fn friend_attrs<'a>(
    attrs: &'a [Attribute],
    name: &'a str,
) -> impl Iterator<Item = &'a Attribute> + 'a {
    attrs
        .iter()
        .filter(move |attr| attr.path().segments.last().is_some_and(|s| s.ident == name))
}

/// Parses the arguments of a friend attribute.
///
/// A bare `#[friend]` or an argument list that does not parse yields no
/// arguments.
#[must_use]
pub fn parse_friend_args(attr: &Attribute) -> Vec<FriendArg> {
    match &attr.meta {
        Meta::Path(_) => Vec::new(),
        Meta::NameValue(nv) => vec![FriendArg::Other(nv.value.to_token_stream().to_string())],
        Meta::List(list) => {
            match list.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
                Ok(args) => args.iter().map(classify_arg).collect(),
                Err(e) => {
                    tracing::debug!("Ignoring malformed friend attribute: {e}");
                    Vec::new()
                }
            }
        }
    }
}

fn classify_arg(expr: &Expr) -> FriendArg {
    match expr {
        Expr::Path(p) if p.qself.is_none() => FriendArg::TypePath(path_segments(&p.path)),
        Expr::Assign(assign) if is_ident(&assign.left, "severity") => {
            FriendArg::Severity(severity_value(&assign.right))
        }
        other => FriendArg::Other(other.to_token_stream().to_string()),
    }
}

fn is_ident(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Path(p) if p.qself.is_none() && p.path.is_ident(name))
}

/// Reads `"warning"`, `Warning` or `Severity::Warning` (and the error forms).
fn severity_value(expr: &Expr) -> SeverityArg {
    let tag = match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Some(s.value()),
            _ => None,
        },
        Expr::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    };

    tag.as_deref().and_then(Severity::from_tag).map_or_else(
        || SeverityArg::Unrecognized(expr.to_token_stream().to_string()),
        SeverityArg::Tag,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn args_of(attr: &Attribute) -> Vec<FriendArg> {
        parse_friend_args(attr)
    }

    fn type_path(parts: &[&str]) -> FriendArg {
        FriendArg::TypePath(parts.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn matches_bare_and_qualified_attribute_paths() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[derive(Debug)]),
            parse_quote!(#[friend(Vault)]),
            parse_quote!(#[friend_lint::friend(Loader)]),
        ];
        assert_eq!(friend_attrs(&attrs, "friend").count(), 2);
        assert_eq!(friend_attrs(&attrs, "restricted").count(), 0);
    }

    #[test]
    fn parses_types_and_severity() {
        let attr: Attribute =
            parse_quote!(#[friend(Loader, crate::io::Reader, severity = "warning")]);
        assert_eq!(
            args_of(&attr),
            vec![
                type_path(&["Loader"]),
                type_path(&["crate", "io", "Reader"]),
                FriendArg::Severity(SeverityArg::Tag(Severity::Warning)),
            ]
        );
    }

    #[test]
    fn accepts_ident_severity_forms() {
        let attr: Attribute = parse_quote!(#[friend(Vault, severity = Warning)]);
        assert_eq!(
            args_of(&attr)[1],
            FriendArg::Severity(SeverityArg::Tag(Severity::Warning))
        );

        let attr: Attribute = parse_quote!(#[friend(Vault, severity = Severity::Error)]);
        assert_eq!(
            args_of(&attr)[1],
            FriendArg::Severity(SeverityArg::Tag(Severity::Error))
        );
    }

    #[test]
    fn keeps_unrecognised_shapes_as_other() {
        let attr: Attribute = parse_quote!(#[friend("Vault", 42, severity = 1)]);
        let args = args_of(&attr);
        assert!(matches!(&args[0], FriendArg::Other(s) if s == "\"Vault\""));
        assert!(matches!(&args[1], FriendArg::Other(s) if s == "42"));
        assert!(matches!(
            &args[2],
            FriendArg::Severity(SeverityArg::Unrecognized(s)) if s == "1"
        ));
    }

    #[test]
    fn bare_and_malformed_attributes_have_no_arguments() {
        let attr: Attribute = parse_quote!(#[friend]);
        assert!(args_of(&attr).is_empty());

        let attr: Attribute = parse_quote!(#[friend(=> Vault)]);
        assert!(args_of(&attr).is_empty());
    }
}
