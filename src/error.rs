use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for catalog, session and pipeline operations.
///
/// Validation, lookup and precondition failures are resolved at the call
/// boundary; service failures abort only the current pipeline stage.
#[derive(Debug, Error)]
pub enum RestyleError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("no style named {0:?} in the catalog")]
    NotFound(String),
    #[error("a style named {0:?} already exists")]
    Duplicate(String),
    #[error("catalog format error: {0}")]
    Format(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("cannot restyle yet: {0}")]
    Precondition(&'static str),
    #[error("a restyle run is already in progress")]
    Concurrency,
    #[error("service error: {0}")]
    Service(String),
    #[error("unexpected response status: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("run cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for RestyleError {
    fn from(value: reqwest::Error) -> Self {
        RestyleError::Service(value.to_string())
    }
}

impl From<tempfile::PersistError> for RestyleError {
    fn from(value: tempfile::PersistError) -> Self {
        RestyleError::Io(value.error)
    }
}
