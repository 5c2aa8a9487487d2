use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{BackendClient, HttpBackend};
use crate::cli::config::{self, SessionFile};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::models::Identity;
use crate::pages::PageContext;
use crate::services::Services;
use crate::state::{AppState, FilePreferences, SessionContext, Severity};

/// Wiring for one CLI invocation over the HTTP backend
pub struct CliContext {
    pub pages: PageContext,
    http: Arc<HttpBackend>,
    state_dir: PathBuf,
}

impl CliContext {
    pub fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let state_dir = config::get_state_dir(config)?;
        let (backend, http) = BackendClient::http(config)?;
        http.set_session_carrier(config::load_session_file(&state_dir)?.carrier);

        let services = Services::new(backend, config.session.clone());
        let session = SessionContext::new(services.auth.clone());
        let app = AppState::new(Arc::new(FilePreferences::new(&state_dir)));

        Ok(Self {
            pages: PageContext::new(services, app, session),
            http,
            state_dir,
        })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Resolves the session and fails when nobody is signed in
    pub async fn require_identity(&self) -> anyhow::Result<Identity> {
        self.pages.session.initialize().await;
        self.pages
            .session
            .identity()
            .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `projectdesk auth login` first"))
    }

    pub fn save_session(&self, user_id: Option<String>) -> anyhow::Result<()> {
        let session = SessionFile::new(self.http.session_carrier(), user_id);
        config::save_session_file(&self.state_dir, &session)
    }

    pub fn clear_session(&self) -> anyhow::Result<()> {
        self.http.set_session_carrier(None);
        config::clear_session_file(&self.state_dir)
    }

    /// Prints the open notification, if any, and closes it
    pub fn flush_notification(&self, output_format: &OutputFormat, data: Option<serde_json::Value>) -> anyhow::Result<()> {
        let note = self.pages.app.notification();
        if !note.open {
            return Ok(());
        }
        self.pages.app.hide_notification();
        match note.severity {
            Severity::Error => output_error(output_format, &note.message, None),
            _ => output_success(output_format, &note.message, data),
        }
    }
}
