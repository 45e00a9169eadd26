//! Error types for the pollution viewer.

use thiserror::Error;

/// Result type alias using ViewerError.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Failure taxonomy of the viewer subsystem.
///
/// Stale results are deliberately absent: a resolved fetch whose fence
/// token is no longer current is not an error and is discarded silently.
/// Out-of-range selections are clamped, never surfaced.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("network error: {0}")]
    Http(String),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("dataset switch rejected for '{dataset}': {message}")]
    SwitchRejected { dataset: String, message: String },

    #[error("upload rejected: {0}")]
    UploadRejected(String),

    #[error("not authenticated: {0}")]
    Unauthorized(String),
}

impl ViewerError {
    /// Wrap a transport-level failure.
    pub fn http(err: impl std::fmt::Display) -> Self {
        ViewerError::Http(err.to_string())
    }

    /// Transient failures leave the previous overlay and axis state
    /// untouched; the next parameter change naturally retries.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ViewerError::Http(_) | ViewerError::Backend { .. } | ViewerError::Decode(_)
        )
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Decode(err.to_string())
    }
}
