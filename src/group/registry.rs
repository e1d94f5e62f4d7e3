//! Group Registry
//!
//! Name -> group lookup shared by the application and the peer server.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::group::Group;
use crate::peers::Loader;

// == Group Registry ==
/// Owns every group of one cache instance.
///
/// Lookups vastly outnumber registrations, hence the reader/writer lock.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates and registers a group.
    ///
    /// Registering a name twice replaces the earlier group: the last
    /// registration wins and holders of the old `Arc` keep a working but
    /// unregistered group.
    pub fn new_group(
        &self,
        name: impl Into<String>,
        max_bytes: usize,
        loader: Arc<dyn Loader>,
    ) -> Arc<Group> {
        let group = Arc::new(Group::new(name, max_bytes, loader));
        let previous = self
            .groups
            .write()
            .insert(group.name().to_string(), Arc::clone(&group));

        if previous.is_some() {
            warn!(group = group.name(), "replaced existing group");
        } else {
            info!(group = group.name(), max_bytes, "group registered");
        }
        group
    }

    // == Get Group ==
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    // == Remove Group ==
    /// Unregisters a group, returning it if it existed.
    pub fn remove_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.write().remove(name)
    }

    /// Registered group names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}
