//! Parsed source files.

use crate::context::FileContext;
use std::path::{Component, Path, PathBuf};

/// A parsed Rust source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    /// File contents.
    pub content: String,
    /// Module path derived from the file location.
    pub module_path: Vec<String>,
    /// Syntax tree.
    pub ast: syn::File,
}

impl SourceFile {
    /// Parses `content` as the file at `relative_path`.
    ///
    /// # Errors
    ///
    /// Returns the `syn` error if the content is not valid Rust.
    pub fn parse(
        relative_path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> syn::Result<Self> {
        let relative_path = relative_path.into();
        let content = content.into();
        let ast = syn::parse_file(&content)?;
        let module_path = compute_module_path(&relative_path);

        Ok(Self {
            relative_path,
            content,
            module_path,
            ast,
        })
    }

    /// Context handed to the model visitors.
    #[must_use]
    pub fn context(&self) -> FileContext<'_> {
        FileContext::new(&self.relative_path, &self.content, &self.module_path)
    }
}

/// Computes the module path from a relative file path.
///
/// Everything up to and including the last `src` directory is dropped, so
/// `crates/app/src/vault/mod.rs` becomes `crate::vault`.
fn compute_module_path(relative_path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = relative_path
        .with_extension("")
        .components()
        .filter_map(|c| {
            if let Component::Normal(s) = c {
                s.to_str().map(String::from)
            } else {
                None
            }
        })
        .collect();

    if let Some(src) = parts.iter().rposition(|p| p == "src") {
        parts.drain(..=src);
    }

    // Remove "mod", "lib" and "main" from the path
    if let Some(last) = parts.last() {
        if last == "mod" || last == "lib" || last == "main" {
            parts.pop();
        }
    }

    parts.insert(0, "crate".to_string());
    parts
}
