//! In-process backend with the same contracts as the hosted service, for tests
//! and local experiments.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

use crate::backend::{
    AccountApi, BackendClient, Document, DocumentList, DocumentStore, FileStorage, Query, SortDirection,
};
use crate::config::{AppConfig, BackendConfig};
use crate::error::{AppError, AppResult};
use crate::models::{Session, User};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    accounts: HashMap<String, (User, String)>,
    current: Option<User>,
    files: HashSet<(String, String)>,
    failing_files: HashSet<String>,
    deleted_files: Vec<String>,
    fail_next: Option<AppError>,
    fail_call: Option<(String, AppError)>,
    last_created: Option<DateTime<Utc>>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Client handle over this backend with the default collection layout
    pub fn client(self: &Arc<Self>) -> BackendClient {
        self.client_with(AppConfig::default().backend)
    }

    pub fn client_with(self: &Arc<Self>, config: BackendConfig) -> BackendClient {
        BackendClient::new(config, self.clone(), self.clone(), self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make `user` the current session holder
    pub fn sign_in(&self, user: User) {
        self.lock().current = Some(user);
    }

    pub fn sign_out(&self) {
        self.lock().current = None;
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().current.clone()
    }

    pub fn put_file(&self, bucket_id: &str, file_id: &str) {
        self.lock()
            .files
            .insert((bucket_id.to_string(), file_id.to_string()));
    }

    /// Every deletion of `file_id` fails with a server error
    pub fn fail_file_deletion(&self, file_id: &str) {
        self.lock().failing_files.insert(file_id.to_string());
    }

    pub fn deleted_files(&self) -> Vec<String> {
        self.lock().deleted_files.clone()
    }

    /// The next document or account call fails with `err`
    pub fn fail_next(&self, err: AppError) {
        self.lock().fail_next = Some(err);
    }

    /// The next call logged as `call` (e.g. `"list:tasks"`) fails with `err`
    pub fn fail_call(&self, call: &str, err: AppError) {
        self.lock().fail_call = Some((call.to_string(), err));
    }

    /// Operation log, e.g. `"list:tasks"`, `"delete_file:f1"`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn document_count(&self, collection_id: &str) -> usize {
        self.lock()
            .collections
            .get(collection_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Insert a document directly, bypassing the call log
    pub fn seed(&self, collection_id: &str, document_id: &str, data: Value) -> Document {
        let mut inner = self.lock();
        let at = Self::next_timestamp(&mut inner);
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let doc = Document::new(document_id, collection_id, at, data);
        inner
            .collections
            .entry(collection_id.to_string())
            .or_default()
            .push(doc.clone());
        doc
    }

    fn begin(&self, call: String) -> AppResult<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        let targeted = inner.fail_call.as_ref().is_some_and(|(target, _)| *target == call);
        inner.calls.push(call);
        if targeted {
            if let Some((_, err)) = inner.fail_call.take() {
                return Err(err);
            }
        }
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(inner),
        }
    }

    // Creation timestamps must be strictly increasing for stable ordering
    fn next_timestamp(inner: &mut Inner) -> DateTime<Utc> {
        let now = Utc::now();
        let at = match inner.last_created {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        inner.last_created = Some(at);
        at
    }

    fn not_found(collection_id: &str, document_id: &str) -> AppError {
        AppError::not_found(format!(
            "Document with the requested ID '{}' could not be found in '{}'",
            document_id, collection_id
        ))
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => {
                match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                    (Ok(dx), Ok(dy)) => dx.cmp(&dy),
                    _ => x.cmp(y),
                }
            }
            (x, y) => x.to_string().cmp(&y.to_string()),
        },
    }
}

fn matches(doc: &Document, queries: &[Query]) -> bool {
    queries.iter().all(|q| match q {
        Query::Equal { attribute, values } => {
            let attr = doc.attribute(attribute).unwrap_or(Value::Null);
            values.iter().any(|v| *v == attr)
        }
        _ => true,
    })
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> AppResult<Document> {
        let mut inner = self.begin(format!("create:{}", collection_id))?;
        let documents = inner.collections.entry(collection_id.to_string()).or_default();
        if documents.iter().any(|d| d.id == document_id) {
            return Err(AppError::remote(
                409,
                Some("document_already_exists".to_string()),
                "Document with the requested ID already exists",
            ));
        }
        let at = Self::next_timestamp(&mut inner);
        let doc = Document::new(document_id, collection_id, at, data);
        inner
            .collections
            .entry(collection_id.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn get_document(&self, collection_id: &str, document_id: &str) -> AppResult<Document> {
        let inner = self.begin(format!("get:{}", collection_id))?;
        inner
            .collections
            .get(collection_id)
            .and_then(|docs| docs.iter().find(|d| d.id == document_id))
            .cloned()
            .ok_or_else(|| Self::not_found(collection_id, document_id))
    }

    async fn list_documents(&self, collection_id: &str, queries: &[Query]) -> AppResult<DocumentList> {
        let inner = self.begin(format!("list:{}", collection_id))?;
        let mut documents: Vec<Document> = inner
            .collections
            .get(collection_id)
            .map(|docs| docs.iter().filter(|d| matches(d, queries)).cloned().collect())
            .unwrap_or_default();

        let orders: Vec<(&str, SortDirection)> = queries
            .iter()
            .filter_map(|q| match q {
                Query::Order { attribute, sort } => Some((attribute.as_str(), *sort)),
                _ => None,
            })
            .collect();
        if !orders.is_empty() {
            documents.sort_by(|a, b| {
                for (attribute, sort) in &orders {
                    let ord = compare_values(a.attribute(attribute).as_ref(), b.attribute(attribute).as_ref());
                    let ord = match sort {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let total = documents.len() as u64;
        if let Some(limit) = queries.iter().find_map(|q| match q {
            Query::Limit(n) => Some(*n as usize),
            _ => None,
        }) {
            documents.truncate(limit);
        }

        Ok(DocumentList { total, documents })
    }

    async fn update_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> AppResult<Document> {
        let mut inner = self.begin(format!("update:{}", collection_id))?;
        let doc = inner
            .collections
            .get_mut(collection_id)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == document_id))
            .ok_or_else(|| Self::not_found(collection_id, document_id))?;
        doc.merge(data, Utc::now());
        Ok(doc.clone())
    }

    async fn delete_document(&self, collection_id: &str, document_id: &str) -> AppResult<()> {
        let mut inner = self.begin(format!("delete:{}", collection_id))?;
        let docs = inner
            .collections
            .get_mut(collection_id)
            .ok_or_else(|| Self::not_found(collection_id, document_id))?;
        let before = docs.len();
        docs.retain(|d| d.id != document_id);
        if docs.len() == before {
            return Err(Self::not_found(collection_id, document_id));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountApi for MemoryBackend {
    async fn get(&self) -> AppResult<User> {
        let inner = self.begin("account:get".to_string())?;
        inner.current.clone().ok_or_else(|| {
            AppError::unauthenticated("User (role: guests) missing scope (account)")
        })
    }

    fn oauth2_url(&self, provider: &str, success: &str, failure: &str) -> AppResult<Url> {
        let mut url = Url::parse(&format!("http://memory.local/v1/account/sessions/oauth2/{}", provider))
            .map_err(|e| AppError::Decode(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("success", success)
            .append_pair("failure", failure);
        Ok(url)
    }

    async fn delete_session(&self, session_id: &str) -> AppResult<()> {
        let mut inner = self.begin(format!("account:delete_session:{}", session_id))?;
        match inner.current.take() {
            Some(_) => Ok(()),
            None => Err(AppError::unauthenticated("No active session")),
        }
    }

    async fn update_prefs(&self, prefs: Map<String, Value>) -> AppResult<User> {
        let mut inner = self.begin("account:update_prefs".to_string())?;
        let user = inner
            .current
            .as_mut()
            .ok_or_else(|| AppError::unauthenticated("No active session"))?;
        user.prefs = prefs;
        Ok(user.clone())
    }

    async fn create(&self, user_id: &str, email: &str, password: &str, name: Option<&str>) -> AppResult<User> {
        let mut inner = self.begin("account:create".to_string())?;
        if inner.accounts.contains_key(email) {
            return Err(AppError::remote(
                409,
                Some("user_already_exists".to_string()),
                "A user with the same id, email, or phone already exists",
            ));
        }
        let user = User {
            id: user_id.to_string(),
            name: name.unwrap_or_default().to_string(),
            email: email.to_string(),
            prefs: Map::new(),
            labels: Vec::new(),
        };
        inner
            .accounts
            .insert(email.to_string(), (user.clone(), password.to_string()));
        Ok(user)
    }

    async fn create_email_session(&self, email: &str, password: &str) -> AppResult<Session> {
        let mut inner = self.begin("account:create_email_session".to_string())?;
        let user = match inner.accounts.get(email) {
            Some((user, stored)) if stored == password => user.clone(),
            _ => {
                return Err(AppError::unauthenticated(
                    "Invalid credentials. Please check the email and password.",
                ))
            }
        };
        inner.current = Some(user.clone());
        Ok(Session {
            id: crate::backend::unique_id(),
            user_id: user.id,
            provider: "email".to_string(),
            expire: None,
        })
    }
}

#[async_trait]
impl FileStorage for MemoryBackend {
    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> AppResult<()> {
        let mut inner = self.lock();
        inner.calls.push(format!("delete_file:{}", file_id));
        if inner.failing_files.contains(file_id) {
            return Err(AppError::remote(500, None, "Storage temporarily unavailable"));
        }
        if !inner.files.remove(&(bucket_id.to_string(), file_id.to_string())) {
            return Err(AppError::not_found(format!("File '{}' not found", file_id)));
        }
        inner.deleted_files.push(file_id.to_string());
        Ok(())
    }
}

/// A signed-in user fixture
pub fn user(id: &str, name: &str, labels: &[&str]) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", id),
        prefs: Map::new(),
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn list_filters_and_orders() {
        let backend = MemoryBackend::new();
        backend.seed("tasks", "t1", json!({"status": "todo", "dueDate": "2024-03-01T00:00:00Z"}));
        backend.seed("tasks", "t2", json!({"status": "done", "dueDate": "2024-01-01T00:00:00Z"}));
        backend.seed("tasks", "t3", json!({"status": "todo", "dueDate": "2024-02-01T00:00:00Z"}));

        let list = backend
            .list_documents("tasks", &[Query::equal("status", "todo"), Query::order_asc("dueDate")])
            .await
            .unwrap();
        let ids: Vec<&str> = list.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t1"]);

        let newest_first = backend
            .list_documents("tasks", &[Query::order_desc("$createdAt")])
            .await
            .unwrap();
        assert_eq!(newest_first.documents[0].id, "t3");
    }

    #[tokio::test]
    async fn injected_failure_hits_once() {
        let backend = MemoryBackend::new();
        backend.fail_next(AppError::remote(503, None, "down"));
        assert!(backend.list_documents("projects", &[]).await.is_err());
        assert!(backend.list_documents("projects", &[]).await.is_ok());
    }

    #[tokio::test]
    async fn account_requires_session() {
        let backend = MemoryBackend::new();
        assert!(matches!(backend.get().await, Err(AppError::Unauthenticated(_))));
        backend.sign_in(user("u1", "Ada", &[]));
        assert_eq!(backend.get().await.unwrap().id, "u1");
    }
}
