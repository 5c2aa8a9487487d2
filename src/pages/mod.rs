pub mod dashboard;
pub mod login;
pub mod not_found;
pub mod project_details;
pub mod project_editor;
pub mod project_list;
pub mod refresh;

pub use dashboard::{DashboardData, DashboardPage};
pub use login::LoginPage;
pub use not_found::NotFoundPage;
pub use project_details::ProjectDetailsPage;
pub use project_editor::{EditorMode, ProjectEditorPage};
pub use project_list::ProjectListPage;
pub use refresh::PageData;

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::Identity;
use crate::services::Services;
use crate::state::{AppState, SessionContext};

/// Everything a page reaches for: services, app state, session
#[derive(Clone)]
pub struct PageContext {
    pub services: Services,
    pub app: Arc<AppState>,
    pub session: Arc<SessionContext>,
}

impl PageContext {
    pub fn new(services: Services, app: Arc<AppState>, session: Arc<SessionContext>) -> Self {
        Self { services, app, session }
    }

    /// Default configuration over an in-memory backend; session not yet initialized
    #[cfg(any(test, feature = "testing"))]
    pub fn for_backend(backend: &Arc<crate::testing::MemoryBackend>) -> Self {
        let config = crate::config::AppConfig::default();
        let services = Services::new(backend.client(), config.session);
        let session = SessionContext::new(services.auth.clone());
        Self::new(services, AppState::in_memory(), session)
    }

    pub fn identity(&self) -> AppResult<Identity> {
        self.session
            .identity()
            .ok_or_else(|| AppError::unauthenticated("You must be logged in to perform this action."))
    }
}
