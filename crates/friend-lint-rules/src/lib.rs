//! # friend-lint-rules
//!
//! Built-in lint rules for friend-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | FRIEND001 | `friend-access` | Restricts `#[friend]` types to their listed friends |
//!
//! ## Usage
//!
//! ```ignore
//! use friend_lint_core::Analyzer;
//! use friend_lint_rules::FriendAccess;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(FriendAccess::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod friend_access;

pub use friend_access::FriendAccess;

/// Re-export core types for convenience.
pub use friend_lint_core::{Rule, RuleBox, Severity, Violation};

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![Box::new(FriendAccess::new())]
}
