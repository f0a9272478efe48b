//! Allow/deny decision for one usage site.

use friend_lint_core::resolver;
use friend_lint_core::{PassContext, Severity, TypeId, UsageSite};
use tracing::trace;

/// A usage that is not permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial {
    /// Type the access is made from.
    pub caller: TypeId,
    /// Restricted type being accessed.
    pub target: TypeId,
    /// Severity configured on the target.
    pub severity: Severity,
}

/// Decides whether `usage` is allowed.
///
/// Allowed when there is no target, the target is unrestricted, there is
/// no enclosing type, the caller is the target itself, or the caller is
/// one of the target's friends. Anything else is denied with the target's
/// severity.
#[must_use]
pub fn decide(pass: &PassContext<'_>, usage: &UsageSite) -> Option<Denial> {
    let target = resolver::classify(usage)?;

    let info = pass.friend_info(target);
    if !info.has_friends() {
        return None;
    }

    let Some(caller) = resolver::caller(usage) else {
        trace!("No enclosing type at {}; allowing", usage.location);
        return None;
    };

    if caller == target || info.is_friend(caller) {
        return None;
    }

    Some(Denial {
        caller,
        target,
        severity: info.severity(),
    })
}
