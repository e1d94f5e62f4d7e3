//! Peer Wire Protocol
//!
//! Message types exchanged between peers and their binary encoding.
//!
//! A request travels in the URL path as `{base_path}{group}/{key}`, each
//! segment percent-encoded. A successful reply carries an encoded
//! [`FetchResponse`] as an `application/octet-stream` body; failures carry a
//! non-success status and a JSON error body instead.

use serde::{Deserialize, Serialize};

/// Default URL prefix peer requests are served under.
pub const DEFAULT_BASE_PATH: &str = "/_peer_cache/";

/// Content type of encoded responses.
pub const CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub group: String,
    pub key: String,
}

impl FetchRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub value: Vec<u8>,
}

impl FetchResponse {
    pub fn new(value: Vec<u8>) -> Self {
        Self { value }
    }
}

pub fn encode_request(request: &FetchRequest) -> bincode::Result<Vec<u8>> {
    bincode::serialize(request)
}

pub fn decode_request(bytes: &[u8]) -> bincode::Result<FetchRequest> {
    bincode::deserialize(bytes)
}

pub fn encode_response(response: &FetchResponse) -> bincode::Result<Vec<u8>> {
    bincode::serialize(response)
}

pub fn decode_response(bytes: &[u8]) -> bincode::Result<FetchResponse> {
    bincode::deserialize(bytes)
}

/// Normalizes a base path to start and end with a single `/`.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
