use serde_json::{Map, Value};
use url::Url;

use crate::backend::{unique_id, BackendClient};
use crate::config::SessionConfig;
use crate::error::AppResult;
use crate::models::{Session, User};

/// Account and session calls against the backend
#[derive(Clone)]
pub struct AuthService {
    backend: BackendClient,
    session: SessionConfig,
}

impl AuthService {
    pub fn new(backend: BackendClient, session: SessionConfig) -> Self {
        Self { backend, session }
    }

    /// Return URLs for the OAuth flow: `(success, failure)`
    pub fn return_urls(&self) -> (String, String) {
        let origin = self.session.app_origin.trim_end_matches('/');
        (format!("{}/", origin), format!("{}/login", origin))
    }

    /// Where to send the user agent to start provider sign-in
    pub fn google_login_url(&self) -> AppResult<Url> {
        let (success, failure) = self.return_urls();
        self.backend
            .account()
            .oauth2_url(&self.session.oauth_provider, &success, &failure)
            .inspect_err(|e| tracing::error!("Google Login Error: {}", e))
    }

    pub async fn current_user(&self) -> AppResult<User> {
        // An error here is the normal answer for anonymous callers
        self.backend
            .account()
            .get()
            .await
            .inspect_err(|e| tracing::debug!("No current user: {}", e))
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.backend
            .account()
            .delete_session("current")
            .await
            .inspect_err(|e| tracing::error!("Logout Error: {}", e))
    }

    pub async fn update_prefs(&self, prefs: Map<String, Value>) -> AppResult<User> {
        self.backend
            .account()
            .update_prefs(prefs)
            .await
            .inspect_err(|e| tracing::error!("Update User Prefs Error: {}", e))
    }

    /// None for an empty name
    pub fn initials_avatar_url(&self, name: &str) -> Option<Url> {
        if name.is_empty() {
            return None;
        }
        self.backend
            .avatars()
            .initials_url(name)
            .inspect_err(|e| tracing::error!("Error getting initials avatar: {}", e))
            .ok()
    }

    /// Custom `avatarUrl` preference first, then the generated initials avatar
    pub fn avatar_url(&self, user: &User) -> Option<String> {
        user.avatar_url()
            .map(str::to_string)
            .or_else(|| self.initials_avatar_url(&user.name).map(|u| u.to_string()))
    }

    pub async fn create_user(&self, email: &str, password: &str, name: Option<&str>) -> AppResult<User> {
        self.backend
            .account()
            .create(&unique_id(), email, password, name)
            .await
            .inspect_err(|e| tracing::error!("Create User Error: {}", e))
    }

    pub async fn create_email_session(&self, email: &str, password: &str) -> AppResult<Session> {
        self.backend
            .account()
            .create_email_session(email, password)
            .await
            .inspect_err(|e| tracing::error!("Create Email Session Error: {}", e))
    }
}
