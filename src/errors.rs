use crate::storage::StorageError;
use axum::http::StatusCode;

/// Rejected checklist / tracker operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("'{0}' is already tracked")]
    DuplicateName(String),

    #[error("no row at index {index} (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let status = match err {
            DomainError::IndexOutOfRange { .. } | DomainError::UnknownTable(_) => {
                StatusCode::NOT_FOUND
            }
            DomainError::EmptyName
            | DomainError::DuplicateName(_)
            | DomainError::NegativeAmount(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!("failed to save table: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "changes were kept for this session but could not be saved".to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
