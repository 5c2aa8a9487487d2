use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

use super::{AccountApi, Document, DocumentList, DocumentStore, FileStorage, Query};
use crate::config::{BackendConfig, HttpConfig};
use crate::error::{AppError, AppResult};
use crate::models::{Session, User};

const FALLBACK_COOKIES: &str = "x-fallback-cookies";
const RESPONSE_FORMAT: &str = "1.5.0";

/// Error body the backend sends with every non-2xx response
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// REST client for an Appwrite-compatible backend.
///
/// The session travels in the `X-Fallback-Cookies` header: whatever the backend
/// hands back is stored and replayed on later requests. Nothing is sent over
/// the network until the first call.
pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    database_id: String,
    debug_logging: bool,
    session: RwLock<Option<String>>,
}

impl HttpBackend {
    pub fn new(backend: &BackendConfig, http: &HttpConfig) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = http.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            http: client,
            endpoint: backend.endpoint.trim_end_matches('/').to_string(),
            project_id: backend.project_id.clone(),
            database_id: backend.database_id.clone(),
            debug_logging: http.debug_logging,
            session: RwLock::new(None),
        })
    }

    /// Opaque session carrier, for persisting between runs
    pub fn session_carrier(&self) -> Option<String> {
        self.session.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_session_carrier(&self, carrier: Option<String>) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = carrier;
    }

    fn documents_path(&self, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.database_id, collection_id
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.endpoint, path);
        if self.debug_logging {
            tracing::debug!("{} {}", method, url);
        }
        let mut builder = self
            .http
            .request(method, url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Response-Format", RESPONSE_FORMAT);
        if let Some(carrier) = self.session_carrier() {
            builder = builder.header("X-Fallback-Cookies", carrier);
        }
        builder
    }

    async fn dispatch(&self, builder: RequestBuilder) -> AppResult<Response> {
        let response = builder.send().await?;

        if let Some(carrier) = response
            .headers()
            .get(FALLBACK_COOKIES)
            .and_then(|v| v.to_str().ok())
        {
            self.set_session_carrier(Some(carrier.to_string()));
        }

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let err = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => AppError::from_status(status.as_u16(), body.kind, body.message),
            Err(_) => AppError::from_status(status.as_u16(), None, format!("HTTP {}", status)),
        };
        Err(err)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = self.dispatch(builder).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> AppResult<()> {
        self.dispatch(builder).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for HttpBackend {
    async fn create_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> AppResult<Document> {
        let builder = self
            .request(Method::POST, &self.documents_path(collection_id))
            .json(&json!({ "documentId": document_id, "data": data }));
        self.send(builder).await
    }

    async fn get_document(&self, collection_id: &str, document_id: &str) -> AppResult<Document> {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        self.send(self.request(Method::GET, &path)).await
    }

    async fn list_documents(&self, collection_id: &str, queries: &[Query]) -> AppResult<DocumentList> {
        let params: Vec<(&str, String)> = queries.iter().map(|q| ("queries[]", q.to_wire())).collect();
        let builder = self
            .request(Method::GET, &self.documents_path(collection_id))
            .query(&params);
        self.send(builder).await
    }

    async fn update_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> AppResult<Document> {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        let builder = self.request(Method::PATCH, &path).json(&json!({ "data": data }));
        self.send(builder).await
    }

    async fn delete_document(&self, collection_id: &str, document_id: &str) -> AppResult<()> {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}

#[async_trait]
impl AccountApi for HttpBackend {
    async fn get(&self) -> AppResult<User> {
        self.send(self.request(Method::GET, "/account")).await
    }

    fn oauth2_url(&self, provider: &str, success: &str, failure: &str) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/account/sessions/oauth2/{}", self.endpoint, provider))
            .map_err(|e| AppError::Decode(format!("invalid endpoint: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("project", &self.project_id)
            .append_pair("success", success)
            .append_pair("failure", failure);
        Ok(url)
    }

    async fn delete_session(&self, session_id: &str) -> AppResult<()> {
        let path = format!("/account/sessions/{}", session_id);
        self.send_empty(self.request(Method::DELETE, &path)).await?;
        if session_id == "current" {
            self.set_session_carrier(None);
        }
        Ok(())
    }

    async fn update_prefs(&self, prefs: Map<String, Value>) -> AppResult<User> {
        let builder = self
            .request(Method::PATCH, "/account/prefs")
            .json(&json!({ "prefs": prefs }));
        self.send(builder).await
    }

    async fn create(&self, user_id: &str, email: &str, password: &str, name: Option<&str>) -> AppResult<User> {
        let mut body = json!({ "userId": user_id, "email": email, "password": password });
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        self.send(self.request(Method::POST, "/account").json(&body)).await
    }

    async fn create_email_session(&self, email: &str, password: &str) -> AppResult<Session> {
        let builder = self
            .request(Method::POST, "/account/sessions/email")
            .json(&json!({ "email": email, "password": password }));
        self.send(builder).await
    }
}

#[async_trait]
impl FileStorage for HttpBackend {
    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> AppResult<()> {
        let path = format!("/storage/buckets/{}/files/{}", bucket_id, file_id);
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}
