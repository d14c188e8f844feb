//! Route guard: decides whether a view may be shown for the current session.
//!
//! The decision is a pure function of the session and the roles a route
//! accepts. It never touches the network or mutates anything.

use crate::session::{Role, Session};

/// Outcome of guarding a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render,
    RedirectToLogin,
    AccessDenied,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Render => "render",
            Decision::RedirectToLogin => "redirect_login",
            Decision::AccessDenied => "access_denied",
        }
    }
}

/// Decide access for a protected view.
///
/// An empty `required` list admits any authenticated user.
pub fn evaluate(session: &Session, required: &[Role]) -> Decision {
    let Some(role) = session.role() else {
        return Decision::RedirectToLogin;
    };
    if required.is_empty() || required.contains(role) {
        Decision::Render
    } else {
        Decision::AccessDenied
    }
}

/// Who may see a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected(&'static [Role]),
}

const EMPLOYEE_ONLY: &[Role] = &[Role::Employee];
const RECRUITER_ONLY: &[Role] = &[Role::Recruiter];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ANY_USER: &[Role] = &[];

/// Every view the client can navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    EmployeeDashboard,
    RecruiterDashboard,
    AdminDashboard,
    Profile,
    Subscriptions,
    AccessDenied,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::EmployeeDashboard,
        Route::RecruiterDashboard,
        Route::AdminDashboard,
        Route::Profile,
        Route::Subscriptions,
        Route::AccessDenied,
    ];

    /// Resolve a path. Unknown paths fall back to Home.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Self::ALL
            .into_iter()
            .find(|r| r.path() == normalized)
            .unwrap_or(Route::Home)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::EmployeeDashboard => "/employee/dashboard",
            Route::RecruiterDashboard => "/recruiter/dashboard",
            Route::AdminDashboard => "/admin/dashboard",
            Route::Profile => "/profile",
            Route::Subscriptions => "/subscriptions",
            Route::AccessDenied => "/unauthorized",
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::Login | Route::Register | Route::AccessDenied => Access::Public,
            Route::EmployeeDashboard => Access::Protected(EMPLOYEE_ONLY),
            Route::RecruiterDashboard => Access::Protected(RECRUITER_ONLY),
            Route::AdminDashboard => Access::Protected(ADMIN_ONLY),
            Route::Profile | Route::Subscriptions => Access::Protected(ANY_USER),
        }
    }

    /// Where a user lands after logging in
    pub fn landing_for(role: &Role) -> Self {
        match role {
            Role::Admin => Route::AdminDashboard,
            Role::Recruiter => Route::RecruiterDashboard,
            Role::Employee => Route::EmployeeDashboard,
            Role::Other(_) => Route::Home,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Guard a route against the session
pub fn check(session: &Session, route: Route) -> Decision {
    match route.access() {
        Access::Public => Decision::Render,
        Access::Protected(required) => evaluate(session, required),
    }
}

/// The route actually shown once the guard has run
pub fn resolve(session: &Session, route: Route) -> (Route, Decision) {
    let decision = check(session, route);
    let shown = match decision {
        Decision::Render => route,
        Decision::RedirectToLogin => Route::Login,
        Decision::AccessDenied => Route::AccessDenied,
    };
    (shown, decision)
}
