//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors surfaced by [`Group`](crate::group::Group) lookups.
///
/// Cloneable so a single deduplicated load can hand the same error to every
/// waiting caller.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Lookups require a non-empty key
    #[error("key is required")]
    EmptyKey,

    /// The loader failed; its message is passed through unchanged
    #[error("{0}")]
    Loader(Arc<anyhow::Error>),

    /// The caller's deadline elapsed before a value was produced
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    /// No group is registered under this name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps a loader failure.
    pub fn loader(err: anyhow::Error) -> Self {
        CacheError::Loader(Arc::new(err))
    }

    fn status(&self) -> StatusCode {
        match self {
            CacheError::EmptyKey => StatusCode::BAD_REQUEST,
            CacheError::Loader(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status(), body).into_response()
    }
}

// == Peer Error Enum ==
/// Failures talking to a remote peer.
///
/// These never reach the application: the group logs them and falls back
/// to its local loader.
#[derive(Error, Debug)]
pub enum PeerError {
    /// Connection, timeout or body read failure
    #[error("peer request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The peer answered with a non-success status
    #[error("peer returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not a valid encoded response
    #[error("malformed peer response: {0}")]
    Decode(#[from] bincode::Error),

    /// The peer address could not be turned into a request URL
    #[error("invalid peer url: {0}")]
    Url(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache lookups.
pub type Result<T> = std::result::Result<T, CacheError>;
