use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Object storage is not configured")]
    StorageUnavailable,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid JSON body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingField(_) | Error::NotFound(_) | Error::InvalidReference(_) => {
                StatusCode::NOT_FOUND
            }
            Error::BadRequest(_)
            | Error::Duplicate(_)
            | Error::InvalidTime(_)
            | Error::UnsupportedExtension(_)
            | Error::Validation(_)
            | Error::JsonBody(_)
            | Error::Base64(_) => StatusCode::BAD_REQUEST,
            Error::Storage(_) | Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            Error::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) | Error::Database(_) | Error::Migrate(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let error_message = match self {
            Error::BadRequest(msg)
            | Error::MissingField(msg)
            | Error::NotFound(msg)
            | Error::Duplicate(msg)
            | Error::InvalidReference(msg)
            | Error::InvalidTime(msg)
            | Error::Storage(msg) => msg,
            Error::UnsupportedExtension(ext) => format!("Unsupported image extension: {}", ext),
            Error::Validation(err) => err.to_string(),
            Error::JsonBody(err) => err.body_text(),
            Error::Base64(err) => format!("Invalid base64 image data: {}", err),
            Error::Reqwest(err) => format!("External service error: {}", err),
            Error::StorageUnavailable => "Object storage is not configured".to_string(),
            _ => "An unexpected error occurred".to_string(),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Duplicate("Resource already exists".to_string())
            }
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_default_to_not_found() {
        assert_eq!(
            Error::MissingField("Missing fields.".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InvalidReference("Sender does not exist.".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::from(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn duplicates_and_bad_times_are_client_errors() {
        assert_eq!(
            Error::Duplicate("User already exists".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidTime("End time must be after start time.".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::StorageUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
