//! Serde mirror of the routing table wire shape.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Cost, InvertibleBloomFilter, NextHop, RoutingEntry, RoutingTable};
use crate::error::CodecError;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireTable {
    pub entries: Vec<WireEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireEntry {
    pub prefix: String,
    pub sequence: u64,
    pub originator: String,
    /// Id of the next hop the sender forwards through
    pub selected: Option<String>,
    pub next_hops: Vec<WireNextHop>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireNextHop {
    pub id: String,
    pub cost: u32,
    /// Element count of the digest
    pub path_len: u32,
    pub path_digest: Vec<u64>,
}

impl From<&RoutingTable> for WireTable {
    fn from(table: &RoutingTable) -> Self {
        Self {
            entries: table.iter().map(WireEntry::from).collect(),
        }
    }
}

impl From<&RoutingEntry> for WireEntry {
    fn from(entry: &RoutingEntry) -> Self {
        Self {
            prefix: entry.prefix().to_string(),
            sequence: entry.sequence(),
            originator: entry.originator().to_string(),
            selected: entry.selected_next_hop().map(|hop| hop.id.clone()),
            next_hops: entry
                .next_hops()
                .map(|hop| WireNextHop {
                    id: hop.id.clone(),
                    cost: hop.cost.value(),
                    path_len: hop.path_digest.count(),
                    path_digest: hop.path_digest.cells().to_vec(),
                })
                .collect(),
        }
    }
}

impl WireTable {
    /// Rebuild the table, rejecting anything the table could not have produced.
    pub fn into_table(self, hash_functions: usize) -> Result<RoutingTable, CodecError> {
        let mut table = RoutingTable::new();

        for wire in self.entries {
            if table.contains(&wire.prefix) {
                return Err(CodecError::DuplicatePrefix(wire.prefix));
            }

            let mut seen = BTreeSet::new();
            let mut entry = RoutingEntry::new(wire.prefix.as_str(), wire.sequence, wire.originator);
            for hop in wire.next_hops {
                if !seen.insert(hop.id.clone()) {
                    return Err(CodecError::DuplicateNextHop {
                        prefix: wire.prefix,
                        id: hop.id,
                    });
                }
                let digest =
                    InvertibleBloomFilter::from_parts(hop.path_digest, hash_functions, hop.path_len)
                        .map_err(|source| CodecError::InvalidDigest {
                            prefix: wire.prefix.clone(),
                            id: hop.id.clone(),
                            source,
                        })?;
                entry.upsert_next_hop(NextHop::new(hop.id, Cost::new(hop.cost), digest));
            }

            // Decoding reselects by id on ties; restore the sender's choice.
            let pinned = match &wire.selected {
                Some(id) => entry.pin_selection(id),
                None => entry.is_withdrawn(),
            };
            if !pinned {
                return Err(CodecError::InvalidSelection {
                    prefix: wire.prefix,
                    selected: wire.selected,
                });
            }
            table.insert(entry);
        }

        Ok(table)
    }
}
