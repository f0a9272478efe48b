//! Rule trait for defining lint rules.

use crate::context::PassContext;
use crate::model::UsageSite;
use crate::types::{Severity, Violation};

/// A lint rule evaluated once per usage site.
///
/// Rules are shared across the worker threads of a pass and must not keep
/// per-pass state of their own; anything memoized for the pass lives in the
/// [`PassContext`].
///
/// # Example
///
/// ```ignore
/// use friend_lint_core::{PassContext, Rule, UsageSite, Violation};
///
/// pub struct NoTopLevelConstruction;
///
/// impl Rule for NoTopLevelConstruction {
///     fn name(&self) -> &'static str { "no-top-level-construction" }
///     fn code(&self) -> &'static str { "FRIEND100" }
///
///     fn check(&self, pass: &PassContext<'_>, usage: &UsageSite) -> Option<Violation> {
///         // ...
///         None
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "friend-access").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "FRIEND001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Evaluates one usage site.
    ///
    /// # Returns
    ///
    /// The finding for this usage, or `None` when it is allowed.
    fn check(&self, pass: &PassContext<'_>, usage: &UsageSite) -> Option<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
