use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub http: HttpConfig,
    pub state: StateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Connection parameters for the hosted backend. Fixed for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collections: CollectionIds,
    pub attachments_bucket_id: String,
}

/// Logical collection name -> backend collection id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionIds {
    pub projects: String,
    pub tasks: String,
    pub milestones: String,
    pub project_teams: String,
    pub users: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Origin the OAuth flow returns to (`{origin}/` on success, `{origin}/login` on failure)
    pub app_origin: String,
    pub oauth_provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// No timeout unless explicitly configured; the transport's own limits apply
    pub request_timeout_secs: Option<u64>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Overrides the default `~/.config/projectdesk` location
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Backend overrides
        if let Ok(v) = env::var("APPWRITE_ENDPOINT") {
            self.backend.endpoint = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("APPWRITE_PROJECT_ID") {
            self.backend.project_id = v;
        }
        if let Ok(v) = env::var("APPWRITE_DATABASE_ID") {
            self.backend.database_id = v;
        }
        if let Ok(v) = env::var("APPWRITE_PROJECTS_COLLECTION_ID") {
            self.backend.collections.projects = v;
        }
        if let Ok(v) = env::var("APPWRITE_TASKS_COLLECTION_ID") {
            self.backend.collections.tasks = v;
        }
        if let Ok(v) = env::var("APPWRITE_MILESTONES_COLLECTION_ID") {
            self.backend.collections.milestones = v;
        }
        if let Ok(v) = env::var("APPWRITE_PROJECT_TEAMS_COLLECTION_ID") {
            self.backend.collections.project_teams = v;
        }
        if let Ok(v) = env::var("APPWRITE_USERS_COLLECTION_ID") {
            self.backend.collections.users = v;
        }
        if let Ok(v) = env::var("APPWRITE_ATTACHMENTS_BUCKET_ID") {
            self.backend.attachments_bucket_id = v;
        }

        // Session overrides
        if let Ok(v) = env::var("APP_ORIGIN") {
            self.session.app_origin = v.trim_end_matches('/').to_string();
        }

        // HTTP overrides
        if let Ok(v) = env::var("HTTP_TIMEOUT_SECS") {
            self.http.request_timeout_secs = v.parse().ok();
        }
        if let Ok(v) = env::var("HTTP_DEBUG_LOGGING") {
            self.http.debug_logging = v.parse().unwrap_or(self.http.debug_logging);
        }

        if let Ok(v) = env::var("PROJECTDESK_STATE_DIR") {
            self.state.dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            backend: BackendConfig {
                endpoint: "http://localhost/v1".to_string(),
                project_id: "your_project_id".to_string(),
                database_id: "your_database_id".to_string(),
                collections: CollectionIds::default(),
                attachments_bucket_id: "task_attachments".to_string(),
            },
            session: SessionConfig {
                app_origin: "http://localhost:5173".to_string(),
                oauth_provider: "google".to_string(),
            },
            http: HttpConfig {
                request_timeout_secs: None,
                debug_logging: true,
            },
            state: StateConfig { dir: None },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            backend: BackendConfig {
                endpoint: "https://staging.example.com/v1".to_string(),
                project_id: "projectdesk-staging".to_string(),
                database_id: "projectdesk".to_string(),
                collections: CollectionIds::default(),
                attachments_bucket_id: "task_attachments".to_string(),
            },
            session: SessionConfig {
                app_origin: "https://staging.example.com".to_string(),
                oauth_provider: "google".to_string(),
            },
            http: HttpConfig {
                request_timeout_secs: None,
                debug_logging: false,
            },
            state: StateConfig { dir: None },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            backend: BackendConfig {
                endpoint: "https://cloud.appwrite.io/v1".to_string(),
                project_id: "projectdesk".to_string(),
                database_id: "projectdesk".to_string(),
                collections: CollectionIds::default(),
                attachments_bucket_id: "task_attachments".to_string(),
            },
            session: SessionConfig {
                app_origin: "https://app.example.com".to_string(),
                oauth_provider: "google".to_string(),
            },
            http: HttpConfig {
                request_timeout_secs: None,
                debug_logging: false,
            },
            state: StateConfig { dir: None },
        }
    }
}

impl Default for CollectionIds {
    fn default() -> Self {
        Self {
            projects: "projects".to_string(),
            tasks: "tasks".to_string(),
            milestones: "milestones".to_string(),
            project_teams: "project_teams".to_string(),
            users: "users_profile".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl StateConfig {
    pub fn resolve_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }
        let home = env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        Ok(PathBuf::from(home).join(".config").join("projectdesk"))
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
