//! API Module
//!
//! HTTP handlers and routing for a cache node.
//!
//! # Endpoints
//! - `GET {base_path}:group/:key` - Peer fetch, binary response
//! - `GET /api/:group/:key` - Look up a key, JSON response
//! - `GET /stats/:group` - Get cache statistics of a group
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
