//! Client-side capability checks.
//!
//! Decides which privileged UI to offer. The backend enforces the same rules
//! independently, so a wrong answer here only hides or shows a button.

use universe_types::user::{Capability, UserSnapshot};

/// Whether `user` holds `capability`.
///
/// Staff hold every capability. Otherwise any badge whose permission flag
/// matches grants it, and the profile's `is_admin` flag also grants the admin
/// panel.
pub fn has_capability(user: &UserSnapshot, capability: Capability) -> bool {
    if user.is_staff {
        return true;
    }
    if capability == Capability::AccessAdminPanel
        && user.profile.as_ref().is_some_and(|p| p.is_admin)
    {
        return true;
    }
    user.badges()
        .iter()
        .any(|badge| capability.granted_by(&badge.permissions))
}

/// Every capability `user` holds, in declaration order.
pub fn capabilities(user: &UserSnapshot) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|c| has_capability(user, *c))
        .collect()
}
