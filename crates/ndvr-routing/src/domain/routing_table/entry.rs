//! Next hops and per-prefix routing entries.

use std::collections::BTreeMap;

use crate::domain::{Cost, InvertibleBloomFilter};

/// One candidate path to a prefix through one neighbor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextHop {
    /// Neighbor router name (or the local router name for an originated prefix)
    pub id: String,
    /// Total cost through this neighbor
    pub cost: Cost,
    /// Routers on the path beyond the local router, starting with `id`
    pub path_digest: InvertibleBloomFilter,
}

impl NextHop {
    pub fn new(id: impl Into<String>, cost: Cost, path_digest: InvertibleBloomFilter) -> Self {
        Self {
            id: id.into(),
            cost,
            path_digest,
        }
    }
}

/// Reachability state for one prefix.
///
/// Holds at most one next hop per id. The selected next hop is kept in the
/// entry itself and re-evaluated on every change:
/// - the current selection survives as long as nothing is strictly cheaper;
/// - otherwise the cheapest hop wins, lowest id first.
///
/// An entry with no next hops is a withdrawn marker for a locally
/// originated prefix; learned entries are removed instead of emptied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingEntry {
    prefix: String,
    sequence: u64,
    originator: String,
    next_hops: BTreeMap<String, NextHop>,
    selected: Option<String>,
}

impl RoutingEntry {
    /// Create an entry without next hops.
    pub fn new(prefix: impl Into<String>, sequence: u64, originator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence,
            originator: originator.into(),
            next_hops: BTreeMap::new(),
            selected: None,
        }
    }

    /// Builder-style variant of [`upsert_next_hop`](Self::upsert_next_hop).
    pub fn with_next_hop(mut self, hop: NextHop) -> Self {
        self.upsert_next_hop(hop);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn originator(&self) -> &str {
        &self.originator
    }

    pub(crate) fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    /// Next hops in id order.
    pub fn next_hops(&self) -> impl Iterator<Item = &NextHop> {
        self.next_hops.values()
    }

    pub fn next_hop(&self, id: &str) -> Option<&NextHop> {
        self.next_hops.get(id)
    }

    pub fn next_hop_count(&self) -> usize {
        self.next_hops.len()
    }

    /// True for a withdrawn marker (no next hops).
    pub fn is_withdrawn(&self) -> bool {
        self.next_hops.is_empty()
    }

    pub fn selected_next_hop(&self) -> Option<&NextHop> {
        self.selected.as_ref().and_then(|id| self.next_hops.get(id))
    }

    /// Cost of the selected path, infinity when there is none.
    pub fn best_cost(&self) -> Cost {
        self.selected_next_hop()
            .map(|hop| hop.cost)
            .unwrap_or(Cost::INFINITY)
    }

    /// Insert or replace the next hop with the same id.
    ///
    /// Returns true if the stored state changed.
    pub fn upsert_next_hop(&mut self, hop: NextHop) -> bool {
        if self.next_hops.get(&hop.id) == Some(&hop) {
            return false;
        }
        self.next_hops.insert(hop.id.clone(), hop);
        self.reselect();
        true
    }

    pub fn remove_next_hop(&mut self, id: &str) -> Option<NextHop> {
        let removed = self.next_hops.remove(id);
        if removed.is_some() {
            self.reselect();
        }
        removed
    }

    /// Select `id` if it is one of the cheapest next hops.
    ///
    /// Returns false and leaves the selection alone otherwise.
    pub(crate) fn pin_selection(&mut self, id: &str) -> bool {
        let min_cost = self.next_hops.values().map(|hop| hop.cost).min();
        match (self.next_hops.get(id), min_cost) {
            (Some(hop), Some(min_cost)) if hop.cost == min_cost => {
                self.selected = Some(id.to_string());
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear_next_hops(&mut self) {
        self.next_hops.clear();
        self.selected = None;
    }

    /// (selected id, best cost): what downstream forwarding observes.
    pub(crate) fn route_signature(&self) -> (Option<String>, Cost) {
        (self.selected.clone(), self.best_cost())
    }

    fn reselect(&mut self) {
        let min_cost = self.next_hops.values().map(|hop| hop.cost).min();
        let Some(min_cost) = min_cost else {
            self.selected = None;
            return;
        };

        // Keep the current path on a tie to avoid churn.
        if let Some(current) = self.selected.as_ref().and_then(|id| self.next_hops.get(id)) {
            if current.cost == min_cost {
                return;
            }
        }

        // BTreeMap iteration is id-ordered, so the first cheapest is the lowest id.
        self.selected = self
            .next_hops
            .values()
            .find(|hop| hop.cost == min_cost)
            .map(|hop| hop.id.clone());
    }
}

