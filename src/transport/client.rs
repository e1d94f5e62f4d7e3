//! Peer Client
//!
//! HTTP implementation of [`PeerGetter`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::error::PeerError;
use crate::peers::PeerGetter;
use crate::transport::protocol::{decode_response, FetchRequest, FetchResponse};

/// Default per-request deadline for peer fetches.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_millis(500);

// == HTTP Getter ==
/// Fetches keys from one remote peer.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    /// `http://{peer}{base_path}`, always ending in `/`
    base_url: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpGetter {
    // == Constructor ==
    /// Creates a getter for `peer` (`host:port` or a full `http://` URL)
    /// serving under `base_path`.
    pub fn new(
        peer: &str,
        base_path: &str,
        client: reqwest::Client,
        timeout: Duration,
    ) -> Result<Self, PeerError> {
        let base_path = crate::transport::protocol::normalize_base_path(base_path);
        let raw = if peer.starts_with("http://") || peer.starts_with("https://") {
            format!("{}{}", peer.trim_end_matches('/'), base_path)
        } else {
            format!("http://{}{}", peer, base_path)
        };
        let base_url = Url::parse(&raw).map_err(|e| PeerError::Url(format!("{}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PeerError::Url(raw));
        }

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    // == Request URL ==
    /// Builds `{base_url}{group}/{key}` with both segments percent-encoded.
    pub fn request_url(&self, request: &FetchRequest) -> Result<Url, PeerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PeerError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&request.group)
            .push(&request.key);
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, PeerError> {
        let url = self.request_url(request)?;
        debug!(%url, "fetching from peer");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PeerError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(decode_response(&body)?)
    }
}
