//! Periodic upkeep: re-origination, polling, staleness and eviction.

use tracing::{debug, info};

use super::core::DvEngine;
use crate::domain::TimerEvent;
use crate::ports::{DvEvent, DvTransport};

impl<T: DvTransport> DvEngine<T> {
    /// Local RT tick.
    ///
    /// Purges withdrawn markers, re-originates our prefixes with a fresh
    /// sequence and polls every active neighbor.
    pub(crate) fn refresh_local_table(&mut self) {
        let now = self.now();

        let purged = self.routing_table.purge_withdrawn();
        if !purged.is_empty() {
            debug!(count = purged.len(), "purged withdrawn prefixes");
        }
        for prefix in &self.local_prefixes {
            self.routing_table
                .originate(prefix, &self.router_prefix, &self.empty_digest, now.as_secs());
        }

        for neighbor in self.neighbors.active_names() {
            self.request_advertisement(&neighbor, false);
        }

        self.scheduler.schedule(
            now.add_secs(self.config.local_rt_interval_secs),
            TimerEvent::LocalRtRefresh,
        );
    }

    /// Evict neighbors silent for longer than `neighbor_timeout`.
    pub(crate) fn sweep_neighbors(&mut self) {
        let now = self.now();
        for neighbor in self
            .neighbors
            .expired_names(now, self.config.neighbor_timeout_secs)
        {
            self.evict_neighbor(&neighbor);
        }
        self.scheduler.schedule(
            now.add_secs(self.config.local_rt_interval_secs),
            TimerEvent::NeighborSweep,
        );
    }

    /// Stop trusting a neighbor until it says Hello again.
    pub(crate) fn mark_stale(&mut self, neighbor: &str, reason: &str) {
        let outstanding = match self.neighbors.get_mut(neighbor) {
            Some(entry) if !entry.is_stale() => {
                let outstanding = entry.outstanding;
                entry.mark_stale();
                outstanding
            }
            _ => return,
        };
        if let Some(request_id) = outstanding {
            self.cancel_pending(request_id);
        }
        self.cancel_retry(neighbor);

        info!(neighbor, reason, "neighbor marked stale");
        self.metrics.record_neighbor_stale();
        self.publish(DvEvent::NeighborStale {
            neighbor: neighbor.to_string(),
        });
        self.drop_routes_via(neighbor);
    }

    /// Forget a neighbor entirely.
    pub(crate) fn evict_neighbor(&mut self, neighbor: &str) {
        let Some(entry) = self.neighbors.remove(neighbor) else {
            return;
        };
        if let Some(request_id) = entry.outstanding {
            self.cancel_pending(request_id);
        }
        self.cancel_retry(neighbor);

        info!(
            neighbor,
            last_seen = %entry.last_seen,
            "neighbor evicted"
        );
        self.metrics.record_neighbor_evicted();
        self.publish(DvEvent::NeighborEvicted {
            neighbor: neighbor.to_string(),
        });
        self.drop_routes_via(neighbor);
    }

    fn drop_routes_via(&mut self, neighbor: &str) {
        let changed = self
            .routing_table
            .remove_next_hops_via(neighbor, &self.router_prefix);
        self.metrics.record_route_changes(changed.len());
        self.publish_route_changes(&changed);
        self.note_topology_change();
    }
}
