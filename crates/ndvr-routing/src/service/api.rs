use tracing::info;

use super::core::DvEngine;
use crate::domain::RoutingTable;
use crate::error::DvError;
use crate::ports::{DvTransport, FibEntry, InboundEvent, RoutingApi};

impl<T: DvTransport> DvEngine<T> {
    /// Selected next hop per learned prefix, bound to the neighbor's face.
    ///
    /// Our own prefixes and routes through neighbors we no longer know are
    /// left out.
    pub fn fib_entries(&self) -> Vec<FibEntry> {
        self.routing_table
            .iter()
            .filter(|entry| entry.originator() != self.router_prefix)
            .filter_map(|entry| {
                let hop = entry.selected_next_hop()?;
                let neighbor = self.neighbors.get(&hop.id)?;
                Some(FibEntry {
                    prefix: entry.prefix().to_string(),
                    next_hop: hop.id.clone(),
                    face_id: neighbor.face_id,
                    cost: hop.cost,
                })
            })
            .collect()
    }

    pub fn announce_prefix(&mut self, prefix: &str) -> Result<u64, DvError> {
        if prefix.trim_matches('/').is_empty() {
            return Err(DvError::Registration {
                prefix: prefix.to_string(),
                reason: "empty prefix".to_string(),
            });
        }
        let now = self.now();
        self.local_prefixes.insert(prefix.to_string());
        let sequence = self.routing_table.originate(
            prefix,
            &self.router_prefix,
            &self.empty_digest,
            now.as_secs(),
        );
        info!(prefix, sequence, "prefix announced");
        self.note_topology_change();
        Ok(sequence)
    }

    pub fn withdraw_prefix(&mut self, prefix: &str) -> bool {
        self.local_prefixes.remove(prefix);
        let withdrawn = self.routing_table.withdraw_local(prefix, &self.router_prefix);
        if withdrawn {
            info!(prefix, "prefix withdrawn");
            self.note_topology_change();
        }
        withdrawn
    }
}

impl<T: DvTransport> RoutingApi for DvEngine<T> {
    fn handle(&mut self, event: InboundEvent) {
        DvEngine::handle(self, event);
    }

    fn routing_table(&self) -> RoutingTable {
        self.routing_table.clone()
    }

    fn fib_entries(&self) -> Vec<FibEntry> {
        DvEngine::fib_entries(self)
    }

    fn announce_prefix(&mut self, prefix: &str) -> Result<u64, DvError> {
        DvEngine::announce_prefix(self, prefix)
    }

    fn withdraw_prefix(&mut self, prefix: &str) -> bool {
        DvEngine::withdraw_prefix(self, prefix)
    }
}
