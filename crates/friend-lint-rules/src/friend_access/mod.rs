//! Rule restricting a type's construction and members to its friends.
//!
//! # Rationale
//!
//! Rust visibility is per module. A type that should only be built or
//! touched by a few collaborators (a credential only the vault may create,
//! a config only the loader may read) has no language-level way to say so.
//! Marking it `#[friend(...)]` lists those collaborators, and this rule
//! reports every other type that reaches into it.
//!
//! # Detected Patterns
//!
//! Inside `impl` blocks of a type that is neither the restricted type nor
//! one of its friends:
//!
//! - Construction: `Secret { .. }`, `Secret(..)`, `Secret`, `Mode::Fast`
//! - Associated function calls: `Secret::new(..)`
//! - Method calls: `secret.reveal()`
//! - Field reads: `secret.key`
//!
//! # Allowed Patterns
//!
//! - The restricted type using itself
//! - Any listed friend
//! - Code outside every `impl` block (free functions, module scope)
//!
//! # Configuration
//!
//! ```rust,ignore
//! #[friend(Vault, Auditor)]                  // Error
//! #[friend(Loader, severity = "warning")]    // Warning
//! ```

mod decision;
mod reporter;
#[cfg(test)]
mod test_model;

pub use decision::{decide, Denial};
pub use reporter::{descriptor_for, report, RuleDescriptor, FRIEND_ERROR, FRIEND_WARNING};

use friend_lint_core::{Label, PassContext, Rule, Severity, UsageSite, Violation};

/// Rule code for friend-access.
pub const CODE: &str = "FRIEND001";

/// Rule name for friend-access.
pub const NAME: &str = "friend-access";

/// Reports usages of restricted types from non-friend types.
#[derive(Debug, Clone, Copy, Default)]
pub struct FriendAccess;

impl FriendAccess {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for FriendAccess {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Restricts construction and member access of #[friend] types to their friends"
    }

    fn default_severity(&self) -> Severity {
        FRIEND_ERROR.default_severity
    }

    fn check(&self, pass: &PassContext<'_>, usage: &UsageSite) -> Option<Violation> {
        let denial = decide(pass, usage)?;
        let model = pass.model();
        let caller = model.display_name(denial.caller);
        let target = model.display_name(denial.target);

        let violation = report(
            descriptor_for(denial.severity),
            usage.location.clone(),
            &caller,
            &target,
        );

        Some(match model.symbol(denial.target) {
            Some(symbol) => violation.with_label(Label::new(
                symbol.location.clone(),
                format!("'{target}' is declared with a friend list here"),
            )),
            None => violation,
        })
    }
}
