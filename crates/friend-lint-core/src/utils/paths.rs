//! Path utilities for AST analysis.

use syn::{Path, Type};

/// Converts a syn Path to a string representation.
///
/// # Example
///
/// ```ignore
/// // For path `crate::vault::Vault`
/// let s = path_to_string(&path);
/// assert_eq!(s, "crate::vault::Vault");
/// ```
#[must_use]
pub fn path_to_string(path: &Path) -> String {
    path_segments(path).join("::")
}

/// Returns the identifiers of a path, dropping generic arguments.
#[must_use]
pub fn path_segments(path: &Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect()
}

/// Returns the path segments of a type, looking through references,
/// parentheses and groups.
///
/// `&mut Secret`, `(Secret)` and `vault::Secret<T>` all yield a path; tuples,
/// slices, trait objects and qualified paths yield `None`.
#[must_use]
pub fn type_path_segments(ty: &Type) -> Option<Vec<String>> {
    match ty {
        Type::Path(p) if p.qself.is_none() => Some(path_segments(&p.path)),
        Type::Reference(r) => type_path_segments(&r.elem),
        Type::Paren(p) => type_path_segments(&p.elem),
        Type::Group(g) => type_path_segments(&g.elem),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn path_to_string_drops_generics() {
        let path: Path = parse_quote!(crate::cache::Store<K, V>);
        assert_eq!(path_to_string(&path), "crate::cache::Store");
    }

    #[test]
    fn type_segments_look_through_references() {
        let ty: Type = parse_quote!(&mut vault::Secret);
        assert_eq!(
            type_path_segments(&ty),
            Some(vec!["vault".to_string(), "Secret".to_string()])
        );

        let ty: Type = parse_quote!((u8, u16));
        assert_eq!(type_path_segments(&ty), None);

        let ty: Type = parse_quote!(<Secret as Default>::Output);
        assert_eq!(type_path_segments(&ty), None);
    }
}
