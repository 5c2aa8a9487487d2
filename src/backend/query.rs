use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_method(&self) -> &'static str {
        match self {
            SortDirection::Asc => "orderAsc",
            SortDirection::Desc => "orderDesc",
        }
    }
}

/// One clause of a document listing. Equality clauses are ANDed; order
/// clauses apply in the order given, first one primary.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal { attribute: String, values: Vec<Value> },
    Order { attribute: String, sort: SortDirection },
    Limit(u32),
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Query::Order {
            attribute: attribute.into(),
            sort: SortDirection::Asc,
        }
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::Order {
            attribute: attribute.into(),
            sort: SortDirection::Desc,
        }
    }

    pub fn limit(limit: u32) -> Self {
        Query::Limit(limit)
    }

    /// JSON form accepted in `queries[]`
    pub fn to_wire(&self) -> String {
        let value = match self {
            Query::Equal { attribute, values } => json!({
                "method": "equal",
                "attribute": attribute,
                "values": values,
            }),
            Query::Order { attribute, sort } => json!({
                "method": sort.as_method(),
                "attribute": attribute,
            }),
            Query::Limit(limit) => json!({
                "method": "limit",
                "values": [limit],
            }),
        };
        value.to_string()
    }

    /// Inverse of [`to_wire`](Self::to_wire); other query methods are rejected
    pub fn from_wire(wire: &str) -> AppResult<Self> {
        #[derive(Deserialize)]
        struct Wire {
            method: String,
            attribute: Option<String>,
            #[serde(default)]
            values: Vec<Value>,
        }

        let parsed: Wire = serde_json::from_str(wire)?;
        let attribute = || {
            parsed
                .attribute
                .clone()
                .ok_or_else(|| AppError::Decode(format!("query '{}' needs an attribute", parsed.method)))
        };
        match parsed.method.as_str() {
            "equal" => Ok(Query::Equal {
                attribute: attribute()?,
                values: parsed.values.clone(),
            }),
            "orderAsc" => Ok(Query::order_asc(attribute()?)),
            "orderDesc" => Ok(Query::order_desc(attribute()?)),
            "limit" => parsed
                .values
                .first()
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .map(Query::Limit)
                .ok_or_else(|| AppError::Decode("limit needs a numeric value".to_string())),
            other => Err(AppError::Decode(format!("unsupported query method '{}'", other))),
        }
    }
}
