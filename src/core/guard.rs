//! Access rules for protected and auth-only areas.
//!
//! Every command declares the logical path it serves. Protected areas need a
//! profile; the sign-in and sign-up areas are pointless once a user has one.

/// Areas that require a signed-in user
pub const PROTECTED_PREFIXES: [&str; 3] = ["/dashboard", "/transactions", "/profile"];
/// Areas only meant for users without a profile
pub const AUTH_PREFIXES: [&str; 2] = ["/login", "/signup"];
/// Where users without a session are sent
pub const LOGIN_PATH: &str = "/login";
/// Where signed-in users are sent
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Let the request through
    Proceed,
    /// Send the user somewhere else
    Redirect(&'static str),
}

/// Decides whether a request for `path` may proceed.
///
/// Matching is a plain prefix test, so `/profile-edit` is protected too.
#[must_use]
pub fn check(path: &str, has_session: bool) -> Access {
    let protected = PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p));
    let auth_only = AUTH_PREFIXES.iter().any(|p| path.starts_with(p));

    if protected && !has_session {
        Access::Redirect(LOGIN_PATH)
    } else if auth_only && has_session {
        Access::Redirect(DASHBOARD_PATH)
    } else {
        Access::Proceed
    }
}
