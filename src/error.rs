// Client error taxonomy
use serde::Serialize;
use std::fmt;

/// A single failed field check from a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every failure a service, form or session call can surface
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Backend document (or file) absent
    #[error("{0}")]
    NotFound(String),

    /// No current session
    #[error("{0}")]
    Unauthenticated(String),

    /// Raised before any network call
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Vec<FieldError>,
    },

    #[error("{0} not implemented")]
    NotImplemented(&'static str),

    /// Any other backend failure (permission, quota, conflict, server error)
    #[error("{message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a backend response
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a shape we could not read
    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        AppError::Unauthenticated(message.into())
    }

    pub fn validation(field_errors: Vec<FieldError>) -> Self {
        let message = match field_errors.as_slice() {
            [only] => only.message.clone(),
            _ => format!("{} fields are invalid", field_errors.len()),
        };
        AppError::Validation { message, field_errors }
    }

    pub fn remote(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        AppError::Remote {
            status,
            code,
            message: message.into(),
        }
    }

    /// Map a backend status/type pair onto the taxonomy
    pub fn from_status(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => AppError::Unauthenticated(message),
            404 => AppError::NotFound(message),
            _ => AppError::remote(status, code, message),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotImplemented(_) => "NOT_IMPLEMENTED",
            AppError::Remote { .. } => "REMOTE_ERROR",
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Decode(_) => "DECODE_ERROR",
        }
    }

    /// True for failures that came from (or on the way to) the backend
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::Remote { .. } | AppError::Transport(_) | AppError::Decode(_)
        )
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation { field_errors, .. } => field_errors,
            _ => &[],
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors = Vec::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                field_errors.push(FieldError::new(field.to_string(), message));
            }
        }
        // HashMap iteration order is arbitrary
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::validation(field_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(AppError::from_status(404, None, "gone"), AppError::NotFound(_)));
        assert!(matches!(
            AppError::from_status(401, Some("general_unauthorized_scope".into()), "no session"),
            AppError::Unauthenticated(_)
        ));
        let err = AppError::from_status(403, Some("user_unauthorized".into()), "denied");
        assert_eq!(err.error_code(), "REMOTE_ERROR");
        assert_eq!(err.to_string(), "denied");
    }

    #[test]
    fn single_field_error_uses_its_message() {
        let err = AppError::validation(vec![FieldError::new("name", "Name is required")]);
        assert_eq!(err.to_string(), "Name is required");
        assert_eq!(err.field_errors().len(), 1);
    }

    #[test]
    fn not_implemented_message() {
        let err = AppError::NotImplemented("Attachment upload");
        assert_eq!(err.to_string(), "Attachment upload not implemented");
        assert!(!err.is_remote());
    }
}
