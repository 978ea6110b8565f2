use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::Display;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use serde::Serialize;
use serde_json::json;
use validator::ValidationErrors;

/// Errors surfaced by page and form handlers.
#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    InvalidInput(String),
    NotFound(String),
    Conflict(String),
    /// A newer request for the same page replaced this one.
    Superseded,
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(fields) => {
                let summary = fields
                    .iter()
                    .map(|e| format!("{} ({})", e.message, e.field))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "Please fix the highlighted fields: {}", summary)
            }
            AppError::InvalidInput(msg) => write!(f, "Invalid request: {}", msg),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Superseded => f.write_str("Request superseded by a newer one"),
            AppError::InternalError(msg) => write!(f, "Something went wrong: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Superseded => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(fields) => json!({ "error": "validation failed", "fields": fields }),
            AppError::Superseded => json!({ "error": "superseded" }),
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(FieldError::collect(&errors))
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::UniqueViolation(constraint) => {
                AppError::Conflict(format!("an entry with this slug already exists ({})", constraint))
            }
            BackendError::NotFound => AppError::NotFound("Record".into()),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

/// Failures reported by the remote row store.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum BackendError {
    #[display("Unique constraint violated: {_0}")]
    UniqueViolation(String),

    #[display("Row not found")]
    NotFound,

    #[display("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[display("Backend unreachable: {_0}")]
    Transport(String),

    #[display("Malformed backend payload: {_0}")]
    Decode(String),
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

/// Sign-in and session failures.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum AuthError {
    #[display("Wrong credentials")]
    WrongCredentials,

    #[display("No signed-in operator")]
    MissingCredentials,

    #[display("Invalid access token")]
    InvalidToken,

    #[display("Could not issue an access token")]
    TokenCreation,

    #[display("Session expired")]
    SessionExpired,

    #[display("Operator password: {_0}")]
    Password(String),

    #[display("Session backend failed: {_0}")]
    Backend(String),
}

impl std::error::Error for AuthError {}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::WrongCredentials | AuthError::InvalidToken | AuthError::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::MissingCredentials => StatusCode::FORBIDDEN,
            AuthError::TokenCreation | AuthError::Password(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::SessionExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Password(err.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Backend(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("hashing failed: {_0}")]
    Hashing(String),

    #[display("stored hash is malformed: {_0}")]
    MalformedHash(String),
}

/// One failed form field, as rendered next to the input.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    /// Flattens validator output, ordered by field name.
    pub fn collect(errors: &ValidationErrors) -> Vec<FieldError> {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_deref()
                        .unwrap_or("Invalid value")
                        .to_string(),
                })
            })
            .collect();

        fields.sort_by(|a, b| a.field.cmp(&b.field));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_become_conflicts() {
        let err = AppError::from(BackendError::UniqueViolation("posts_slug_key".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("posts_slug_key"));
    }

    #[test]
    fn other_backend_failures_are_internal() {
        let err = AppError::from(BackendError::Transport("connection refused".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
