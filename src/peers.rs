//! Capabilities a group is composed from: where values come from on a miss,
//! and how keys are routed to and fetched from remote peers.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PeerError;
use crate::transport::{FetchRequest, FetchResponse};

// == Loader ==
/// Application-supplied source of truth, consulted on a cache miss.
///
/// Errors are handed back to the caller of `Group::get` unchanged and are
/// never cached.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapts a closure into a [`Loader`]; see [`loader_fn`].
pub struct LoaderFn<F>(F);

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key.to_string()).await
    }
}

/// Wraps an async closure as a shareable loader.
///
/// ```
/// use peer_cache::peers::loader_fn;
///
/// let loader = loader_fn(|key| async move { Ok::<_, anyhow::Error>(key.into_bytes()) });
/// ```
pub fn loader_fn<F, Fut>(f: F) -> Arc<dyn Loader>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    Arc::new(LoaderFn(f))
}

// == Peer Getter ==
/// Fetches a value from the peer that owns it.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, PeerError>;
}

// == Peer Picker ==
/// Routes a key to the peer that owns it.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when the key should be loaded
    /// locally (no peers known, or this instance owns the key).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
