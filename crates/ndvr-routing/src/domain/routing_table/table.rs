//! Prefix-keyed routing table and local origination.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use super::{NextHop, RoutingEntry};
use crate::domain::{Cost, InvertibleBloomFilter};

/// Reachability state for every known prefix, ordered by prefix.
///
/// Exclusively owned by one engine. Readers outside the engine get a clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    entries: BTreeMap<String, RoutingEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, prefix: &str) -> Option<&RoutingEntry> {
        self.entries.get(prefix)
    }

    pub(crate) fn get_mut(&mut self, prefix: &str) -> Option<&mut RoutingEntry> {
        self.entries.get_mut(prefix)
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.entries.contains_key(prefix)
    }

    /// Insert an entry keyed by its prefix, returning the one it replaced.
    pub fn insert(&mut self, entry: RoutingEntry) -> Option<RoutingEntry> {
        self.entries.insert(entry.prefix().to_string(), entry)
    }

    pub fn remove(&mut self, prefix: &str) -> Option<RoutingEntry> {
        self.entries.remove(prefix)
    }

    /// Entries in prefix order.
    pub fn iter(&self) -> btree_map::Values<'_, String, RoutingEntry> {
        self.entries.values()
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Announce (or re-announce) a prefix originated by `local_router`.
    ///
    /// The sequence becomes `max(previous + 1, floor)`, so it strictly
    /// increases across re-originations. Passing the clock as `floor` keeps
    /// it increasing across restarts too. A learned entry for the same
    /// prefix is replaced.
    ///
    /// Returns the new sequence.
    pub fn originate(
        &mut self,
        prefix: &str,
        local_router: &str,
        empty_digest: &InvertibleBloomFilter,
        floor: u64,
    ) -> u64 {
        let previous = self
            .entries
            .get(prefix)
            .filter(|entry| entry.originator() == local_router)
            .map(RoutingEntry::sequence)
            .unwrap_or(0);
        let sequence = previous.saturating_add(1).max(floor);

        let entry = RoutingEntry::new(prefix, sequence, local_router).with_next_hop(NextHop::new(
            local_router,
            Cost::ZERO,
            empty_digest.clone(),
        ));
        self.entries.insert(prefix.to_string(), entry);
        sequence
    }

    /// Withdraw a locally originated prefix.
    ///
    /// Leaves a marker with no next hops and a bumped sequence, which is
    /// advertised until [`purge_withdrawn`](Self::purge_withdrawn) runs.
    /// Returns false if the prefix is not ours.
    pub fn withdraw_local(&mut self, prefix: &str, local_router: &str) -> bool {
        match self.entries.get_mut(prefix) {
            Some(entry) if entry.originator() == local_router && !entry.is_withdrawn() => {
                entry.set_sequence(entry.sequence().saturating_add(1));
                entry.clear_next_hops();
                true
            }
            _ => false,
        }
    }

    /// Drop withdrawn markers. Returns the purged prefixes.
    pub fn purge_withdrawn(&mut self) -> Vec<String> {
        let purged: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_withdrawn())
            .map(|entry| entry.prefix().to_string())
            .collect();
        for prefix in &purged {
            self.entries.remove(prefix);
        }
        purged
    }

    /// Remove every next hop through `neighbor`.
    ///
    /// Used when a neighbor goes stale or is evicted. Entries left without
    /// next hops are dropped. Returns the prefixes whose selected route
    /// changed (or disappeared).
    pub fn remove_next_hops_via(&mut self, neighbor: &str, local_router: &str) -> BTreeSet<String> {
        let mut changed = BTreeSet::new();
        let mut emptied = Vec::new();

        for entry in self.entries.values_mut() {
            if entry.originator() == local_router || entry.next_hop(neighbor).is_none() {
                continue;
            }
            let before = entry.route_signature();
            entry.remove_next_hop(neighbor);
            if entry.is_withdrawn() {
                emptied.push(entry.prefix().to_string());
            } else if entry.route_signature() != before {
                changed.insert(entry.prefix().to_string());
            }
        }

        for prefix in emptied {
            self.entries.remove(&prefix);
            changed.insert(prefix);
        }
        changed
    }

    /// Prefixes that currently have a next hop through `neighbor`.
    pub fn prefixes_via<'a>(&'a self, neighbor: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .values()
            .filter(move |entry| entry.next_hop(neighbor).is_some())
            .map(RoutingEntry::prefix)
    }
}

impl<'a> IntoIterator for &'a RoutingTable {
    type Item = &'a RoutingEntry;
    type IntoIter = btree_map::Values<'a, String, RoutingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

impl FromIterator<RoutingEntry> for RoutingTable {
    fn from_iter<I: IntoIterator<Item = RoutingEntry>>(iter: I) -> Self {
        let mut table = RoutingTable::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}
