// errors.rs
use thiserror::Error;

/// Failures reported by the data-access and session collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// No session, or the backend rejected the credentials/token.
    #[error("Authentication error: {0}")]
    Auth(String),
    /// Transport failure or unexpected backend response.
    #[error("Network error: {0}")]
    Network(String),
    /// The targeted record is no longer present.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (DB, backend).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Database Error: {0}")]
    DbError(String),
    #[error("Backend Error: {0}")]
    Backend(String),
    #[error("Internal Server Error")]
    InternalError,
}

impl From<DataError> for ServerError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Auth(msg) => ServerError::Unauthorized(msg),
            DataError::NotFound(_) => ServerError::NotFound,
            DataError::Network(msg) => ServerError::Backend(msg),
        }
    }
}

impl From<rusqlite::Error> for DataError {
    fn from(err: rusqlite::Error) -> Self {
        DataError::Network(format!("sqlite: {err}"))
    }
}
