//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::consistenthash::DEFAULT_REPLICAS;
use crate::transport::{DEFAULT_BASE_PATH, DEFAULT_PEER_TIMEOUT};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget of each group's cache
    pub cache_bytes: usize,
    /// Address this node listens on, spelled the way peers list it
    pub server_addr: String,
    /// Every node of the cluster, this one included
    pub peers: Vec<String>,
    /// Virtual positions per peer on the hash ring
    pub replicas: usize,
    /// URL prefix peer requests are served under
    pub base_path: String,
    /// Deadline for one peer fetch
    pub peer_timeout: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BYTES` - Byte budget per group (default: 2048)
    /// - `SERVER_ADDR` - Listen address (default: 127.0.0.1:8001)
    /// - `PEERS` - Comma-separated peer addresses (default: just `SERVER_ADDR`)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `BASE_PATH` - Peer request prefix (default: /_peer_cache/)
    /// - `PEER_TIMEOUT_MS` - Peer fetch deadline in milliseconds (default: 500)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let server_addr = env::var("SERVER_ADDR").unwrap_or(defaults.server_addr);
        let peers = env::var("PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![server_addr.clone()]);

        Self {
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            server_addr,
            peers,
            replicas: parse_var("REPLICAS").unwrap_or(defaults.replicas),
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            peer_timeout: parse_var("PEER_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.peer_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let server_addr = "127.0.0.1:8001".to_string();
        Self {
            cache_bytes: 2 << 10,
            peers: vec![server_addr.clone()],
            server_addr,
            replicas: DEFAULT_REPLICAS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            peer_timeout: DEFAULT_PEER_TIMEOUT,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Splits a comma-separated peer list, dropping blanks.
pub fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}
