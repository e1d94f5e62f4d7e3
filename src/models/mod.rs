//! Response models for the HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) serialized into
//! JSON response bodies. Peer traffic uses the binary types in
//! [`crate::transport::protocol`] instead.

pub mod responses;

// Re-export commonly used types
pub use responses::{GetResponse, HealthResponse, StatsResponse};
