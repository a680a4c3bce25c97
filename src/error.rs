use thiserror::Error;

/// Failures that can occur while fetching or persisting articles.
///
/// None of these cross the coordinator boundary: the remote source and the
/// article store hand them up, and the coordinator turns them into
/// [`NewsResult`](crate::news::NewsResult) outcomes after logging.
#[derive(Debug, Error)]
pub enum NewsError {
  #[error("network error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("provider responded with status {status}: {message}")]
  Status { status: u16, message: String },
  #[error("malformed payload: {0}")]
  Payload(#[from] serde_json::Error),
  #[error("storage error: {0}")]
  Storage(#[from] rusqlite::Error),
  #[error("failed to create cache directory {path}: {source}")]
  CacheDir {
    path: std::path::PathBuf,
    source: std::io::Error,
  },
  #[error("storage lock poisoned")]
  LockPoisoned,
  #[error("invalid provider endpoint: {0}")]
  Endpoint(#[from] url::ParseError),
  #[error("unreadable cache timestamp {0:?}")]
  Timestamp(String),
}

pub type Result<T, E = NewsError> = std::result::Result<T, E>;
