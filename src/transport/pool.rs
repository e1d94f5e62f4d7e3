//! Peer Pool
//!
//! Tracks the peer set on a consistent-hash ring and hands out an
//! [`HttpGetter`] for whichever peer owns a key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::consistenthash::{HashFn, HashRing, DEFAULT_REPLICAS};
use crate::error::PeerError;
use crate::peers::{PeerGetter, PeerPicker};
use crate::transport::client::{HttpGetter, DEFAULT_PEER_TIMEOUT};
use crate::transport::protocol::{normalize_base_path, DEFAULT_BASE_PATH};

#[derive(Default)]
struct Membership {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == Peer Pool ==
/// HTTP peer picker for one instance.
///
/// `self_addr` must be spelled exactly as the other peers list this
/// instance, otherwise keys it owns will be routed back to itself over the
/// network.
pub struct PeerPool {
    self_addr: String,
    base_path: String,
    replicas: usize,
    hash: Option<HashFn>,
    timeout: Duration,
    client: reqwest::Client,
    state: RwLock<Membership>,
}

impl PeerPool {
    // == Constructor ==
    /// Creates a pool for `self_addr` with the default base path, replica
    /// count and timeout, and no peers.
    pub fn new(self_addr: impl Into<String>) -> Self {
        Self {
            self_addr: self_addr.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
            timeout: DEFAULT_PEER_TIMEOUT,
            client: reqwest::Client::new(),
            state: RwLock::new(Membership::default()),
        }
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self.state.get_mut().ring = HashRing::new(replicas, self.hash.clone());
        self
    }

    /// Overrides the ring's hash function.
    pub fn with_hash(mut self, hash: HashFn) -> Self {
        self.hash = Some(hash);
        self.state.get_mut().ring = HashRing::new(self.replicas, self.hash.clone());
        self
    }

    /// Deadline applied to every peer fetch.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    // == Set Peers ==
    /// Replaces the whole peer set. Addresses may include this instance.
    pub fn set_peers<S: AsRef<str>>(&self, peers: &[S]) -> Result<(), PeerError> {
        let mut next = Membership {
            ring: HashRing::new(self.replicas, self.hash.clone()),
            getters: HashMap::new(),
        };
        self.insert_peers(&mut next, peers)?;

        let mut state = self.state.write();
        *state = next;
        info!(
            self_addr = %self.self_addr,
            peers = ?state.ring.peers(),
            "peer set replaced"
        );
        Ok(())
    }

    // == Add Peers ==
    /// Adds peers to the current set; known peers are left untouched.
    pub fn add_peers<S: AsRef<str>>(&self, peers: &[S]) -> Result<(), PeerError> {
        let mut state = self.state.write();
        let fresh: Vec<&str> = peers
            .iter()
            .map(AsRef::as_ref)
            .filter(|peer| !state.getters.contains_key(*peer))
            .collect();
        self.insert_peers(&mut state, &fresh)?;
        info!(added = ?fresh, "peers added");
        Ok(())
    }

    // == Remove Peer ==
    /// Drops a peer; only the keys it owned move to other peers.
    pub fn remove_peer(&self, peer: &str) {
        let mut state = self.state.write();
        if state.getters.remove(peer).is_some() {
            state.ring.remove(peer);
            info!(peer, "peer removed");
        } else {
            warn!(peer, "remove requested for unknown peer");
        }
    }

    // == Peers ==
    pub fn peers(&self) -> Vec<String> {
        self.state.read().ring.peers()
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Owner of `key` on the ring, including this instance.
    pub fn owner_of(&self, key: &str) -> Option<String> {
        self.state.read().ring.get(key).map(str::to_string)
    }

    fn insert_peers<S: AsRef<str>>(
        &self,
        membership: &mut Membership,
        peers: &[S],
    ) -> Result<(), PeerError> {
        // Build every getter before touching the ring so a bad address
        // leaves the membership unchanged.
        let mut getters = Vec::with_capacity(peers.len());
        for peer in peers {
            let peer = peer.as_ref();
            if membership.getters.contains_key(peer) || getters.iter().any(|(p, _)| p == peer) {
                continue;
            }
            let getter = HttpGetter::new(peer, &self.base_path, self.client.clone(), self.timeout)?;
            getters.push((peer.to_string(), Arc::new(getter)));
        }

        let addrs: Vec<&str> = getters.iter().map(|(peer, _)| peer.as_str()).collect();
        membership.ring.add(&addrs);
        membership.getters.extend(getters);
        Ok(())
    }
}

impl PeerPicker for PeerPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let peer = state.ring.get(key)?;
        if peer == self.self_addr {
            return None;
        }
        debug!(key, peer, "picked peer");
        state
            .getters
            .get(peer)
            .map(|getter| Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}
