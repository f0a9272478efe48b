//! Context types for model building and rule execution.

use crate::index::{FriendIndex, FriendInfo};
use crate::model::{SemanticModel, TypeId};
use crate::types::Location;
use std::path::Path;
use std::sync::Arc;

/// Context for one source file while the model is being built.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// Path relative to the project root.
    pub relative_path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Module path of the file (e.g., `["crate", "vault"]`).
    pub module_path: &'a [String],
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(relative_path: &'a Path, content: &'a str, module_path: &'a [String]) -> Self {
        Self {
            relative_path,
            content,
            module_path,
        }
    }

    /// Builds a [`Location`] for a span in this file.
    #[must_use]
    pub fn location(&self, span: proc_macro2::Span) -> Location {
        let start = span.start();
        let end = span.end();
        let offset = self.offset_for(start.line, start.column + 1);
        let end_offset = self.offset_for(end.line, end.column + 1);

        Location::new(self.relative_path.to_path_buf(), start.line, start.column + 1)
            .with_span(offset, end_offset.saturating_sub(offset))
    }

    /// Calculates byte offset for a given line and column.
    ///
    /// # Arguments
    ///
    /// * `line` - 1-indexed line number
    /// * `column` - 1-indexed column number
    ///
    /// # Returns
    ///
    /// Byte offset from the start of the file, or 0 if out of bounds.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in self.content.lines().enumerate() {
            if i + 1 == line {
                return offset + column.saturating_sub(1);
            }
            offset += line_content.len() + 1; // +1 for newline
        }

        offset
    }
}

/// Context shared by every rule evaluation within one analysis pass.
///
/// Holds the program model and the pass's [`FriendIndex`]. A new context,
/// with a new index, is created for every pass.
#[derive(Clone, Copy)]
pub struct PassContext<'a> {
    model: &'a dyn SemanticModel,
    friends: &'a FriendIndex,
}

impl<'a> PassContext<'a> {
    /// Creates a pass context.
    #[must_use]
    pub fn new(model: &'a dyn SemanticModel, friends: &'a FriendIndex) -> Self {
        Self { model, friends }
    }

    /// The program model.
    #[must_use]
    pub fn model(&self) -> &'a dyn SemanticModel {
        self.model
    }

    /// The pass's friend index.
    #[must_use]
    pub fn friends(&self) -> &'a FriendIndex {
        self.friends
    }

    /// Friend info of `target`, built on first request in this pass.
    #[must_use]
    pub fn friend_info(&self, target: TypeId) -> Arc<FriendInfo> {
        self.friends.get_or_build(target, self.model)
    }
}

impl std::fmt::Debug for PassContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassContext")
            .field("usages", &self.model.usages().len())
            .field("friends", &self.friends)
            .finish()
    }
}
