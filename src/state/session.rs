use std::sync::Arc;

use tokio::sync::watch;
use url::Url;

use crate::error::{AppError, AppResult};
use crate::models::Identity;
use crate::router::Route;
use crate::services::AuthService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unknown,
    Authenticated,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<Identity>,
    pub loading: bool,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match (&self.user, self.loading) {
            (_, true) => SessionStatus::Unknown,
            (Some(_), false) => SessionStatus::Authenticated,
            (None, false) => SessionStatus::Anonymous,
        }
    }
}

/// Holder of the current identity.
///
/// Starts in [`SessionStatus::Unknown`] and resolves after [`initialize`](Self::initialize).
/// Observers subscribe to the underlying `watch` channel.
pub struct SessionContext {
    auth: AuthService,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    pub fn new(auth: AuthService) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState {
            user: None,
            loading: true,
        });
        Arc::new(Self { auth, state })
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().user.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().user.as_ref().is_some_and(Identity::is_admin)
    }

    /// Startup query; any failure counts as signed out
    pub async fn initialize(&self) -> SessionStatus {
        let user = match self.auth.current_user().await {
            Ok(user) => {
                let identity = Identity::new(user);
                tracing::info!("Session established for {} ({:?})", identity.id(), identity.role);
                Some(identity)
            }
            Err(_) => {
                tracing::info!("No active session");
                None
            }
        };
        self.state.send_replace(SessionState { user, loading: false });
        self.status()
    }

    /// Re-runs the startup query from the unknown state
    pub async fn refresh(&self) -> SessionStatus {
        self.state.send_modify(|s| s.loading = true);
        self.initialize().await
    }

    /// Returns the provider URL to send the user to; state stays loading until the return trip
    pub fn login_with_google(&self) -> AppResult<Url> {
        self.state.send_modify(|s| s.loading = true);
        self.auth
            .google_login_url()
            .inspect_err(|_| self.state.send_modify(|s| s.loading = false))
    }

    /// Ends the backend session; yields the route to navigate to
    pub async fn logout(&self) -> AppResult<Route> {
        self.state.send_modify(|s| s.loading = true);
        let result = self.auth.logout().await;
        self.state.send_modify(|s| {
            if result.is_ok() {
                s.user = None;
            }
            s.loading = false;
        });
        result.map(|()| {
            tracing::info!("Signed out");
            Route::Login
        })
    }

    /// Drops the identity when a call reports the session is gone
    pub fn invalidate_on(&self, err: &AppError) -> bool {
        if !matches!(err, AppError::Unauthenticated(_)) {
            return false;
        }
        self.state.send_if_modified(|s| {
            let changed = s.user.is_some() || s.loading;
            s.user = None;
            s.loading = false;
            changed
        })
    }

    pub async fn wait_resolved(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let resolved = match rx.wait_for(|s| !s.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        resolved
    }
}
