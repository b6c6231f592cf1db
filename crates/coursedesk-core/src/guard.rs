//! Route guard: decides whether a navigation goes through or is redirected
//! based on session presence.

use crate::auth::Session;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Routes that need an authenticated session, including their sub-paths
pub const PROTECTED_PATHS: [&str; 3] = ["/dashboard", "/categories", "/courses"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(&'static str),
}

/// `path` is `protected` itself or below it. `/dashboardx` is not below
/// `/dashboard`.
fn is_under(path: &str, protected: &str) -> bool {
    path == protected
        || path
            .strip_prefix(protected)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn is_protected(path: &str) -> bool {
    PROTECTED_PATHS.iter().any(|p| is_under(path, p))
}

/// Decide where a navigation to `path` should end up
pub fn resolve(path: &str, authenticated: bool) -> Navigation {
    if authenticated && path == LOGIN_PATH {
        return Navigation::Redirect(DASHBOARD_PATH);
    }
    if !authenticated && is_protected(path) {
        return Navigation::Redirect(LOGIN_PATH);
    }
    Navigation::Allow
}

/// Route guard bound to a session, for the navigation layer to call before
/// each route change.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Session,
}

impl RouteGuard {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn check(&self, path: &str) -> Navigation {
        resolve(path, self.session.is_authenticated())
    }
}
