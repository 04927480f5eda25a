//! Ordered cache of visible networks.
//!
//! The cache holds one immutable [`NetworkSnapshot`] at a time. A refresh
//! never touches the live snapshot: it builds a complete replacement from
//! the daemon and swaps it in only once every query has succeeded. A failed
//! refresh leaves the previous snapshot in place.

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::Result;
use crate::api::models::NetworkEntry;
use crate::core::daemon::StationDaemon;
use crate::util::utils::strength_from_signal;

/// An immutable view of the visible networks.
///
/// The ordered id list and the entry map always hold exactly the same ids,
/// with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSnapshot {
    order: Vec<String>,
    entries: HashMap<String, NetworkEntry>,
}

impl NetworkSnapshot {
    /// Builds a snapshot from entries in priority order.
    ///
    /// A repeated id keeps its first (higher priority) position and entry.
    pub fn from_ordered(entries: impl IntoIterator<Item = NetworkEntry>) -> Self {
        let mut snapshot = Self::default();
        for entry in entries {
            if snapshot.entries.contains_key(&entry.id) {
                debug!("Dropping duplicate network id {}", entry.id);
                continue;
            }
            snapshot.order.push(entry.id.clone());
            snapshot.entries.insert(entry.id.clone(), entry);
        }
        snapshot
    }

    /// Queries the daemon and builds a fresh snapshot.
    ///
    /// Fails as a whole if the ordered list or any per-network query fails.
    pub async fn fetch(daemon: &dyn StationDaemon) -> Result<Self> {
        let ordered = daemon.ordered_networks().await?;
        let mut entries = Vec::with_capacity(ordered.len());

        for (id, signal) in ordered {
            let attrs = daemon.network_attributes(&id).await?;
            entries.push(NetworkEntry::new(
                id,
                strength_from_signal(signal),
                attrs.name,
                attrs.security,
            ));
        }

        Ok(Self::from_ordered(entries))
    }

    /// Network ids, most preferred first.
    pub fn ordered_ids(&self) -> &[String] {
        &self.order
    }

    /// Looks up one network by id.
    pub fn get(&self, id: &str) -> Option<&NetworkEntry> {
        self.entries.get(id)
    }

    /// Entries in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Shared holder of the current [`NetworkSnapshot`].
///
/// Readers take an `Arc` to the snapshot, so a swap never disturbs a reader
/// that is halfway through iterating.
#[derive(Debug, Default)]
pub(crate) struct NetworkCache {
    current: RwLock<Arc<NetworkSnapshot>>,
}

impl NetworkCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot currently in effect.
    pub(crate) fn snapshot(&self) -> Arc<NetworkSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the whole snapshot.
    pub(crate) fn replace(&self, snapshot: NetworkSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Rebuilds the cache from the daemon.
    ///
    /// On error the previous snapshot stays in effect and the error is
    /// returned to the caller.
    pub(crate) async fn refresh(&self, daemon: &dyn StationDaemon) -> Result<()> {
        let snapshot = NetworkSnapshot::fetch(daemon).await?;
        debug!("Network cache refreshed: {} networks", snapshot.len());
        self.replace(snapshot);
        Ok(())
    }

    pub(crate) fn lookup(&self, id: &str) -> Option<NetworkEntry> {
        self.snapshot().get(id).cloned()
    }

    pub(crate) fn ordered_ids(&self) -> Vec<String> {
        self.snapshot().ordered_ids().to_vec()
    }
}
