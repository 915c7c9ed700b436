//! Per-neighbor protocol session state.

use std::collections::btree_map::{self, BTreeMap};

use crate::domain::{Cost, FaceId, RequestId, Timestamp};

/// Liveness of a neighbor session.
///
/// `Unknown → Active` on the first Hello. A neighbor that fails to answer
/// (retries exhausted or NACK) goes `Stale`; a Hello revives it. Neighbors
/// silent for longer than the configured timeout are evicted from the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborState {
    Active,
    Stale,
}

/// One directly connected router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborEntry {
    /// Router name (`/<network>/%C1.Router/<name>`)
    pub name: String,
    /// Face the neighbor's Hello arrived on
    pub face_id: FaceId,
    /// Version tag of the most recent advertisement request
    pub advertisement_version: u64,
    /// Cost of the link to this neighbor
    pub link_cost: Cost,
    pub state: NeighborState,
    /// Last time we heard from it (Hello or advertisement)
    pub last_seen: Timestamp,
    /// Consecutive unanswered requests
    pub failed_attempts: u32,
    /// The request we are waiting on, if any
    pub outstanding: Option<RequestId>,
}

impl NeighborEntry {
    pub fn new(name: impl Into<String>, face_id: FaceId, link_cost: Cost, now: Timestamp) -> Self {
        Self {
            name: name.into(),
            face_id,
            advertisement_version: 0,
            link_cost,
            state: NeighborState::Active,
            last_seen: now,
            failed_attempts: 0,
            outstanding: None,
        }
    }

    /// Bump and return the advertisement version.
    pub fn next_version(&mut self) -> u64 {
        self.advertisement_version = self.advertisement_version.saturating_add(1);
        self.advertisement_version
    }

    pub fn touch(&mut self, now: Timestamp) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    pub fn is_stale(&self) -> bool {
        self.state == NeighborState::Stale
    }

    pub fn mark_stale(&mut self) {
        self.state = NeighborState::Stale;
        self.outstanding = None;
    }

    pub fn revive(&mut self, now: Timestamp) {
        self.state = NeighborState::Active;
        self.failed_attempts = 0;
        self.touch(now);
    }

    /// True once the neighbor has been silent for longer than `timeout_secs`.
    pub fn is_expired(&self, now: Timestamp, timeout_secs: u64) -> bool {
        now.secs_since(self.last_seen) > timeout_secs
    }
}

/// All known neighbors keyed by router name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborMap {
    neighbors: BTreeMap<String, NeighborEntry>,
}

impl NeighborMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.neighbors.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&NeighborEntry> {
        self.neighbors.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut NeighborEntry> {
        self.neighbors.get_mut(name)
    }

    /// Insert a neighbor, returning the entry it replaced.
    pub fn insert(&mut self, entry: NeighborEntry) -> Option<NeighborEntry> {
        self.neighbors.insert(entry.name.clone(), entry)
    }

    pub fn remove(&mut self, name: &str) -> Option<NeighborEntry> {
        self.neighbors.remove(name)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, NeighborEntry> {
        self.neighbors.values()
    }

    /// Names of neighbors that are not stale.
    pub fn active_names(&self) -> Vec<String> {
        self.neighbors
            .values()
            .filter(|n| !n.is_stale())
            .map(|n| n.name.clone())
            .collect()
    }

    /// Names of neighbors silent for longer than `timeout_secs`.
    pub fn expired_names(&self, now: Timestamp, timeout_secs: u64) -> Vec<String> {
        self.neighbors
            .values()
            .filter(|n| n.is_expired(now, timeout_secs))
            .map(|n| n.name.clone())
            .collect()
    }
}
