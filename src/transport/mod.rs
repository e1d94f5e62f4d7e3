//! Peer Transport
//!
//! Binary request/response protocol between cache instances, the HTTP client
//! that speaks it, and the pool that routes keys to peers. The serving side
//! lives with the rest of the HTTP surface in [`crate::api`].

mod client;
mod pool;
pub mod protocol;

pub use client::{HttpGetter, DEFAULT_PEER_TIMEOUT};
pub use pool::PeerPool;
pub use protocol::{FetchRequest, FetchResponse, CONTENT_TYPE, DEFAULT_BASE_PATH};
