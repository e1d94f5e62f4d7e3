//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::cache::{ByteView, CacheStats};

/// Response body for a lookup (GET /api/:group/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub group: String,
    pub key: String,
    /// The value, decoded as UTF-8 with invalid sequences replaced
    pub value: String,
}

impl GetResponse {
    pub fn new(group: impl Into<String>, key: impl Into<String>, value: &ByteView) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            value: value.to_string_lossy(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub group: String,
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(group: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            group: group.into(),
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Registered group names
    pub groups: Vec<String>,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(groups: Vec<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            groups,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
