//! Consistent Hashing
//!
//! Maps keys onto a ring of peer addresses. Each peer occupies `replicas`
//! virtual positions so that load spreads evenly even with few peers, and
//! adding or removing one peer only moves the keys in that peer's segments.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

/// Hash function placing virtual nodes and keys on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Default number of virtual positions per peer.
pub const DEFAULT_REPLICAS: usize = 50;

// == Default Hash ==
/// SipHash with fixed keys, truncated to 32 bits.
///
/// Deterministic across processes running the same build, which is all the
/// ring needs as long as every peer runs the same binary.
pub fn default_hash(data: &[u8]) -> u32 {
    let mut hasher = DefaultHasher::new();
    hasher.write(data);
    hasher.finish() as u32
}

// == Hash Ring ==
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted virtual node positions
    positions: Vec<u32>,
    /// Position -> owning peer
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring. `replicas` of zero is treated as one, and
    /// `None` selects [`default_hash`].
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(|| Arc::new(default_hash)),
            replicas: replicas.max(1),
            positions: Vec::new(),
            owners: HashMap::new(),
        }
    }

    // == Add ==
    /// Places each peer at `replicas` positions, hashing `"{i}{peer}"`.
    pub fn add<S: AsRef<str>>(&mut self, peers: &[S]) {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{}{}", i, peer).as_bytes());
                if self.owners.insert(position, peer.to_string()).is_none() {
                    self.positions.push(position);
                }
            }
        }
        self.positions.sort_unstable();
    }

    // == Remove ==
    /// Takes a peer's positions off the ring; other peers keep theirs.
    pub fn remove(&mut self, peer: &str) {
        self.owners.retain(|_, owner| owner != peer);
        let owners = &self.owners;
        self.positions.retain(|position| owners.contains_key(position));
    }

    // == Get ==
    /// Returns the peer owning the first position at or after the key's hash,
    /// wrapping to the smallest position. `None` on an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.positions.partition_point(|&position| position < hash);
        let position = self.positions[idx % self.positions.len()];
        self.owners.get(&position).map(String::as_str)
    }

    // == Peers ==
    /// Distinct peers currently on the ring, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.owners.values().cloned().collect();
        peers.sort();
        peers.dedup();
        peers
    }

    /// Number of virtual positions on the ring.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS, None)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("positions", &self.positions.len())
            .field("peers", &self.peers())
            .finish()
    }
}
