use std::fmt;
use std::sync::Arc;

use crate::state::{SessionContext, SessionStatus};

/// Client-side route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Root,
    Dashboard,
    Projects,
    ProjectNew,
    ProjectEdit(String),
    ProjectDetail(String),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Root,
            ["login"] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["projects"] => Route::Projects,
            ["projects", "new"] => Route::ProjectNew,
            ["projects", "edit", id] => Route::ProjectEdit(id.to_string()),
            ["projects", id] => Route::ProjectDetail(id.to_string()),
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Root => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::ProjectNew => "/projects/new".to_string(),
            Route::ProjectEdit(id) => format!("/projects/edit/{}", id),
            Route::ProjectDetail(id) => format!("/projects/{}", id),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::NotFound(_))
    }

    /// `/` always lands on the dashboard
    pub fn resolve(self) -> Self {
        match self {
            Route::Root => Route::Dashboard,
            other => other,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session still resolving; show the full-screen busy indicator
    Busy,
    Render(Route),
    Redirect(Route),
}

/// Gate for protected routes. Redirects discard the attempted destination.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionContext>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }

    pub fn check(&self, route: &Route) -> GuardOutcome {
        let route = route.clone().resolve();
        if route.is_public() {
            return GuardOutcome::Render(route);
        }
        match self.session.status() {
            SessionStatus::Unknown => GuardOutcome::Busy,
            SessionStatus::Authenticated => GuardOutcome::Render(route),
            SessionStatus::Anonymous => {
                tracing::debug!("Redirecting {} to login", route);
                GuardOutcome::Redirect(Route::Login)
            }
        }
    }

    /// Waits out the unknown state, then decides
    pub async fn navigate(&self, path: &str) -> GuardOutcome {
        let route = Route::parse(path).resolve();
        if !route.is_public() {
            self.session.wait_resolved().await;
        }
        self.check(&route)
    }
}
