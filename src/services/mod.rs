pub mod auth_service;
pub mod project_service;
pub mod task_service;

pub use auth_service::AuthService;
pub use project_service::ProjectService;
pub use task_service::TaskService;

use crate::backend::BackendClient;
use crate::config::SessionConfig;

/// The three domain services over one backend handle
#[derive(Clone)]
pub struct Services {
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub auth: AuthService,
}

impl Services {
    pub fn new(backend: BackendClient, session: SessionConfig) -> Self {
        Self {
            projects: ProjectService::new(backend.clone()),
            tasks: TaskService::new(backend.clone()),
            auth: AuthService::new(backend, session),
        }
    }
}
