//! Error types for the Todo Watcher server.
//!
//! # Error Types
//!
//! - [`ServerError`] - Errors returned by request handlers
//!
//! Handler-level errors ([`OpenError`], [`CoreError`]) convert into it with
//! `?`. Startup failures (configuration, watcher) are reported by the binary
//! through `anyhow`.

use axum::http::StatusCode;
use thiserror::Error;
use todo_watcher_core::CoreError;

use crate::editor::OpenError;

/// Error type for request handlers.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The todo folder could not be parsed.
    #[error("{0}")]
    Parse(#[from] CoreError),

    /// A file could not be opened in the editor.
    #[error("{0}")]
    Open(#[from] OpenError),

    /// Unexpected internal server error.
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Creates a new internal error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use todo_watcher_server::error::ServerError;
    ///
    /// let err = ServerError::internal("parser task panicked");
    /// assert!(matches!(err, ServerError::Internal(_)));
    /// ```
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Open(OpenError::MissingFile | OpenError::OutsideTodoFolder { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Open(OpenError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if this error indicates a client-side problem.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Returns `true` if this error indicates a server-side problem.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}
