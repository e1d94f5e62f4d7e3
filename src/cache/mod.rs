//! Cache Module
//!
//! Provides the byte-budgeted in-memory store behind every group.

mod byteview;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use byteview::ByteView;
pub use entry::{entry_size, CacheEntry};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{EvictionCallback, LruCache, SharedCache};
