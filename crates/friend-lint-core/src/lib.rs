//! # friend-lint-core
//!
//! Core framework for friend-access checking over a semantic model of Rust
//! sources.
//!
//! A type marked with `#[friend(...)]` names the types allowed to construct
//! it, call its methods and read its fields. This crate provides:
//!
//! - [`SemanticModel`] and the built-in [`Program`] model built with `syn`
//! - [`FriendAnnotation`] for interpreting annotation arguments
//! - [`FriendIndex`] for memoizing friend sets within one pass
//! - [`resolver`] for classifying usage sites
//! - [`Rule`] trait and [`Analyzer`] for orchestrating a pass
//!
//! ## Example
//!
//! ```ignore
//! use friend_lint_core::Analyzer;
//! use friend_lint_rules::FriendAccess;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(FriendAccess::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! result.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod annotation;
mod config;
mod context;
mod index;
mod rule;
mod types;

pub mod model;
pub mod resolver;
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use annotation::{AnnotationArg, FriendAnnotation, RawAnnotation, SeverityArg};
pub use config::{
    AnalyzerConfig, Config, ConfigError, FriendConfig, RuleConfig, DEFAULT_ATTRIBUTE,
};
pub use context::{FileContext, PassContext};
pub use index::{FriendIndex, FriendInfo};
pub use model::{
    ConstructorResolution, Program, SemanticModel, SourceFile, TypeId, TypeKind, TypeSymbol,
    UsageKind, UsageSite,
};
pub use rule::{Rule, RuleBox};
pub use types::{
    Label, LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic,
};
