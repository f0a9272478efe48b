//! Maps denied accesses to findings.

use friend_lint_core::{Location, Severity, Suggestion, Violation};

use super::{CODE, NAME};

/// Static description of a finding kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDescriptor {
    /// Rule identifier shared by both variants.
    pub id: &'static str,
    /// Short title.
    pub title: &'static str,
    /// Category the rule is listed under.
    pub category: &'static str,
    /// Message template; `{0}` is the caller, `{1}` the target.
    pub message_format: &'static str,
    /// Severity of findings reported through this descriptor.
    pub default_severity: Severity,
}

impl RuleDescriptor {
    /// Fills the message template.
    #[must_use]
    pub fn format_message(&self, caller: &str, target: &str) -> String {
        self.message_format
            .replace("{0}", caller)
            .replace("{1}", target)
    }
}

const TITLE: &str = "Access restricted to friend types";
const CATEGORY: &str = "Design";
const MESSAGE_FORMAT: &str = "'{0}' is not a friend of '{1}'";

/// Blocking variant.
pub static FRIEND_ERROR: RuleDescriptor = RuleDescriptor {
    id: CODE,
    title: TITLE,
    category: CATEGORY,
    message_format: MESSAGE_FORMAT,
    default_severity: Severity::Error,
};

/// Advisory variant.
pub static FRIEND_WARNING: RuleDescriptor = RuleDescriptor {
    id: CODE,
    title: TITLE,
    category: CATEGORY,
    message_format: MESSAGE_FORMAT,
    default_severity: Severity::Warning,
};

/// Selects the descriptor for a restricted type's severity.
#[must_use]
pub fn descriptor_for(severity: Severity) -> &'static RuleDescriptor {
    match severity {
        Severity::Error => &FRIEND_ERROR,
        Severity::Warning => &FRIEND_WARNING,
    }
}

/// Emits one finding for a denied usage.
#[must_use]
pub fn report(
    descriptor: &RuleDescriptor,
    location: Location,
    caller_name: &str,
    target_name: &str,
) -> Violation {
    Violation::new(
        descriptor.id,
        NAME,
        descriptor.default_severity,
        location,
        descriptor.format_message(caller_name, target_name),
    )
    .with_suggestion(Suggestion::new(format!(
        "list '{caller_name}' in the friend attribute of '{target_name}', \
         or go through one of its friends"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn descriptors_differ_only_in_severity() {
        assert_eq!(FRIEND_ERROR.id, FRIEND_WARNING.id);
        assert_eq!(FRIEND_ERROR.title, FRIEND_WARNING.title);
        assert_eq!(FRIEND_ERROR.category, FRIEND_WARNING.category);
        assert_eq!(FRIEND_ERROR.message_format, FRIEND_WARNING.message_format);
        assert_eq!(FRIEND_ERROR.default_severity, Severity::Error);
        assert_eq!(FRIEND_WARNING.default_severity, Severity::Warning);
    }

    #[test]
    fn descriptor_follows_severity() {
        assert_eq!(descriptor_for(Severity::Error), &FRIEND_ERROR);
        assert_eq!(descriptor_for(Severity::Warning), &FRIEND_WARNING);
    }

    #[test]
    fn report_fills_template() {
        let location = Location::new(PathBuf::from("src/other.rs"), 12, 5);
        let violation = report(&FRIEND_WARNING, location.clone(), "Random", "Config");

        assert_eq!(violation.code, "FRIEND001");
        assert_eq!(violation.rule, "friend-access");
        assert_eq!(violation.severity, Severity::Warning);
        assert_eq!(violation.location, location);
        assert_eq!(violation.message, "'Random' is not a friend of 'Config'");
        insta::assert_snapshot!(
            violation.to_string(),
            @"src/other.rs:12:5: warning [FRIEND001] 'Random' is not a friend of 'Config'"
        );
    }
}
