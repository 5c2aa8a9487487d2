use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Metadata fields the backend owns; never sent as document data
pub const SYSTEM_FIELDS: &[&str] = &[
    "$id",
    "$collectionId",
    "$databaseId",
    "$createdAt",
    "$updatedAt",
    "$permissions",
];

/// One persisted record as the backend returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$collectionId", default)]
    pub collection_id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        collection_id: impl Into<String>,
        created_at: DateTime<Utc>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            collection_id: collection_id.into(),
            created_at,
            updated_at: created_at,
            data: strip_system_fields(data),
        }
    }

    /// Attribute lookup that also resolves the `$` metadata names
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "$id" => Some(Value::String(self.id.clone())),
            "$collectionId" => Some(Value::String(self.collection_id.clone())),
            "$createdAt" => serde_json::to_value(self.created_at).ok(),
            "$updatedAt" => serde_json::to_value(self.updated_at).ok(),
            _ => self.data.get(name).cloned(),
        }
    }

    /// Partial update: given keys replace, everything else is kept
    pub fn merge(&mut self, patch: Map<String, Value>, at: DateTime<Utc>) -> &mut Self {
        for (key, value) in strip_system_fields(patch) {
            self.data.insert(key, value);
        }
        self.updated_at = at;
        self
    }

    pub fn into_record<T: DeserializeOwned>(self) -> AppResult<T> {
        let id = self.id.clone();
        let value = serde_json::to_value(self)?;
        serde_json::from_value(value)
            .map_err(|e| AppError::Decode(format!("document {}: {}", id, e)))
    }
}

impl DocumentList {
    pub fn into_records<T: DeserializeOwned>(self) -> AppResult<Vec<T>> {
        self.documents.into_iter().map(Document::into_record).collect()
    }
}

/// Serialize a typed payload into document data, dropping metadata keys
pub fn to_data<T: Serialize>(payload: &T) -> AppResult<Map<String, Value>> {
    match serde_json::to_value(payload)? {
        Value::Object(map) => Ok(strip_system_fields(map)),
        other => Err(AppError::Decode(format!("expected object payload, got {}", other))),
    }
}

fn strip_system_fields(mut map: Map<String, Value>) -> Map<String, Value> {
    map.retain(|key, _| !SYSTEM_FIELDS.contains(&key.as_str()));
    map
}
