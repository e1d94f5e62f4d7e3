//! Group Module
//!
//! A group is a named cache namespace: one loader, one byte-budgeted cache,
//! and optionally a peer picker that spreads ownership of keys across
//! instances.
//!
//! # Lookup Flow
//! 1. Empty keys are rejected
//! 2. A local cache hit is returned as is
//! 3. On a miss, concurrent lookups for the key are collapsed into one load
//! 4. The load asks the owning peer first, if there is one other than us;
//!    values served by a peer are not cached here since the owner caches them
//! 5. Otherwise, or if the peer fails, the loader runs and its value is cached

mod registry;

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, SharedCache};
use crate::error::{CacheError, PeerError, Result};
use crate::peers::{Loader, PeerGetter, PeerPicker};
use crate::singleflight::Flight;
use crate::transport::FetchRequest;

pub use registry::GroupRegistry;

// == Group ==
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    cache: SharedCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    /// Collapses whole lookups, peer round trips included
    routed: Flight<ByteView, CacheError>,
    /// Collapses loader calls, whether reached from `get` or from a peer
    local: Flight<ByteView, CacheError>,
}

impl Group {
    // == Constructor ==
    /// Creates a standalone group. Most callers go through
    /// [`GroupRegistry::new_group`] so peers can find the group by name.
    pub fn new(name: impl Into<String>, max_bytes: usize, loader: Arc<dyn Loader>) -> Self {
        Self {
            name: name.into(),
            loader,
            cache: SharedCache::new(max_bytes),
            peers: OnceLock::new(),
            routed: Flight::new(),
            local: Flight::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Installs the peer picker.
    ///
    /// # Panics
    /// If a picker is already installed on this group.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) {
        if self.peers.set(picker).is_err() {
            panic!(
                "register_peers called more than once for group '{}'",
                self.name
            );
        }
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        if let Some(value) = self.cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }
        self.load(key).await
    }

    /// [`Group::get`] bounded by a deadline. Work already started for the
    /// key keeps running for other callers.
    pub async fn get_with_timeout(&self, key: &str, deadline: Duration) -> Result<ByteView> {
        tokio::time::timeout(deadline, self.get(key))
            .await
            .map_err(|_| CacheError::Timeout(deadline))?
    }

    // == Get Local ==
    /// Like [`Group::get`] but never consults peers. Used to serve peer
    /// requests, so a key is never bounced between instances.
    pub async fn get_local(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        if let Some(value) = self.cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }
        self.load_locally(key).await
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        self.routed
            .work(key, || async {
                if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => return Ok(value),
                        Err(err) => warn!(
                            group = %self.name,
                            key,
                            error = %err,
                            "peer fetch failed, loading locally"
                        ),
                    }
                }
                self.load_locally(key).await
            })
            .await
    }

    async fn load_locally(&self, key: &str) -> Result<ByteView> {
        self.local
            .work(key, || async {
                let bytes = self.loader.load(key).await.map_err(CacheError::loader)?;
                let value = ByteView::from(bytes);
                self.cache.add(key, value.clone());
                debug!(group = %self.name, key, size = value.len(), "loaded locally");
                Ok(value)
            })
            .await
    }

    async fn get_from_peer(
        &self,
        peer: &dyn PeerGetter,
        key: &str,
    ) -> std::result::Result<ByteView, PeerError> {
        let request = FetchRequest::new(self.name.as_str(), key);
        let response = peer.fetch(&request).await?;
        Ok(ByteView::from(response.value))
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}
