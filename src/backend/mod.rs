pub mod document;
pub mod http;
pub mod query;

pub use document::{Document, DocumentList};
pub use http::HttpBackend;
pub use query::{Query, SortDirection};

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

use crate::config::{AppConfig, BackendConfig};
use crate::error::{AppError, AppResult};
use crate::models::{Session, User};

/// Document collection operations over one database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> AppResult<Document>;

    async fn get_document(&self, collection_id: &str, document_id: &str) -> AppResult<Document>;

    async fn list_documents(&self, collection_id: &str, queries: &[Query]) -> AppResult<DocumentList>;

    /// Partial merge of `data` into the stored document
    async fn update_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> AppResult<Document>;

    async fn delete_document(&self, collection_id: &str, document_id: &str) -> AppResult<()>;
}

/// Session operations for the current caller
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Fails with `Unauthenticated` when there is no session
    async fn get(&self) -> AppResult<User>;

    /// URL the user agent must be sent to; the provider redirects back to `success` or `failure`
    fn oauth2_url(&self, provider: &str, success: &str, failure: &str) -> AppResult<Url>;

    /// `session_id` of `"current"` ends the caller's own session
    async fn delete_session(&self, session_id: &str) -> AppResult<()>;

    async fn update_prefs(&self, prefs: Map<String, Value>) -> AppResult<User>;

    async fn create(&self, user_id: &str, email: &str, password: &str, name: Option<&str>) -> AppResult<User>;

    async fn create_email_session(&self, email: &str, password: &str) -> AppResult<Session>;
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> AppResult<()>;
}

/// Logical collections the application knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Projects,
    Tasks,
    Milestones,
    ProjectTeams,
    Users,
}

/// URL builder for generated avatars; never performs a request itself
#[derive(Debug, Clone)]
pub struct Avatars {
    endpoint: String,
    project_id: String,
}

impl Avatars {
    pub fn new(endpoint: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            project_id: project_id.into(),
        }
    }

    pub fn initials_url(&self, name: &str) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/avatars/initials", self.endpoint))
            .map_err(|e| AppError::Decode(format!("invalid endpoint: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("project", &self.project_id);
        Ok(url)
    }
}

/// The single handle to the remote service. Cloning shares the same sub-clients.
#[derive(Clone)]
pub struct BackendClient {
    config: Arc<BackendConfig>,
    documents: Arc<dyn DocumentStore>,
    account: Arc<dyn AccountApi>,
    storage: Arc<dyn FileStorage>,
    avatars: Avatars,
}

impl BackendClient {
    pub fn new(
        config: BackendConfig,
        documents: Arc<dyn DocumentStore>,
        account: Arc<dyn AccountApi>,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        let avatars = Avatars::new(config.endpoint.clone(), config.project_id.clone());
        Self {
            config: Arc::new(config),
            documents,
            account,
            storage,
            avatars,
        }
    }

    /// HTTP-backed client from application config
    pub fn http(config: &AppConfig) -> AppResult<(Self, Arc<HttpBackend>)> {
        let backend = Arc::new(HttpBackend::new(&config.backend, &config.http)?);
        let client = Self::new(
            config.backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
        );
        Ok((client, backend))
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn collection_id(&self, collection: Collection) -> &str {
        let ids = &self.config.collections;
        match collection {
            Collection::Projects => &ids.projects,
            Collection::Tasks => &ids.tasks,
            Collection::Milestones => &ids.milestones,
            Collection::ProjectTeams => &ids.project_teams,
            Collection::Users => &ids.users,
        }
    }

    pub fn collection(&self, collection: Collection) -> CollectionHandle<'_> {
        CollectionHandle {
            id: self.collection_id(collection),
            store: self.documents.as_ref(),
        }
    }

    pub fn account(&self) -> &dyn AccountApi {
        self.account.as_ref()
    }

    pub fn storage(&self) -> &dyn FileStorage {
        self.storage.as_ref()
    }

    pub fn avatars(&self) -> &Avatars {
        &self.avatars
    }
}

/// Document operations bound to one collection
pub struct CollectionHandle<'a> {
    id: &'a str,
    store: &'a dyn DocumentStore,
}

impl CollectionHandle<'_> {
    pub fn id(&self) -> &str {
        self.id
    }

    pub async fn create(&self, document_id: &str, data: Map<String, Value>) -> AppResult<Document> {
        self.store.create_document(self.id, document_id, data).await
    }

    pub async fn get(&self, document_id: &str) -> AppResult<Document> {
        self.store.get_document(self.id, document_id).await
    }

    pub async fn list(&self, queries: &[Query]) -> AppResult<DocumentList> {
        self.store.list_documents(self.id, queries).await
    }

    pub async fn update(&self, document_id: &str, data: Map<String, Value>) -> AppResult<Document> {
        self.store.update_document(self.id, document_id, data).await
    }

    pub async fn delete(&self, document_id: &str) -> AppResult<()> {
        self.store.delete_document(self.id, document_id).await
    }
}

/// Client-generated document id (hex, within the backend's 36-char limit)
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
