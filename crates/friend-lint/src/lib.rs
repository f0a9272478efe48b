//! # friend-lint
//!
//! Friend-access linter for Rust projects.
//!
//! A type marked `#[friend(...)]` may only be constructed, have its methods
//! called, or its fields read from within its own `impl` blocks and those
//! of the listed friend types. This is the facade crate re-exporting the
//! core framework, the macros and the built-in rule.
//!
//! ## Marking Types
//!
//! ```rust,ignore
//! use friend_lint::friend;
//!
//! #[friend(Vault)]
//! pub struct Secret { key: [u8; 32] }
//!
//! #[friend(Loader, severity = "warning")]
//! pub struct Config { level: u8 }
//! ```
//!
//! ## `cargo test` Integration
//!
//! ```rust,ignore
//! // tests/friends.rs
//! friend_lint::check!();
//! ```
//!
//! Configure via `friend-lint.toml` at the workspace root.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use friend_lint::Analyzer;
//! use friend_lint::rules::FriendAccess;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(FriendAccess::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]

pub use friend_lint_core::*;

pub use friend_lint_macros::{check, friend};

/// Built-in rules.
pub mod rules {
    pub use friend_lint_rules::*;
}

mod runner;

#[doc(hidden)]
pub mod __internal {
    pub use crate::runner::run_check;
}
