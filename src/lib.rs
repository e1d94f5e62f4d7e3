//! Peer Cache - An embeddable distributed cache
//!
//! Lets many instances jointly cache the results of an expensive fetch:
//! keys are sharded across peers with consistent hashing, each instance keeps
//! a byte-budgeted LRU cache, and concurrent misses for one key collapse
//! into a single load.
//!
//! ```no_run
//! use std::sync::Arc;
//! use peer_cache::{loader_fn, GroupRegistry};
//!
//! # async fn demo() -> peer_cache::error::Result<()> {
//! let registry = Arc::new(GroupRegistry::new());
//! let scores = registry.new_group(
//!     "scores",
//!     2 << 10,
//!     loader_fn(|key| async move { Ok::<_, anyhow::Error>(key.into_bytes()) }),
//! );
//! let value = scores.get("tom").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod consistenthash;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod singleflight;
pub mod transport;

pub use api::{create_router, AppState};
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, PeerError};
pub use group::{Group, GroupRegistry};
pub use peers::{loader_fn, Loader, PeerGetter, PeerPicker};
pub use transport::PeerPool;
