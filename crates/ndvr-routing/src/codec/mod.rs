//! Wire codec for routing tables.
//!
//! One canonical shape: entries in prefix order, each naming its selected
//! next hop and listing its next hops in id order, each next hop carrying its
//! path digest cells. Encoded with
//! bincode (fixed-width integers, bounded length).
//!
//! Decoding never fails outward: anything malformed, truncated, oversized or
//! inconsistent becomes an empty table and a `warn!`. Use
//! [`WireCodec::try_decode`] when the reason matters.

mod wire;

use bincode::Options;
use tracing::warn;

use crate::domain::{
    DvConfig, RoutingTable, DEFAULT_MAX_MESSAGE_BYTES, IBF_DEFAULT_HASH_FUNCTIONS,
};
use crate::error::CodecError;
use wire::WireTable;

/// Encoder/decoder bound to a size limit and digest parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireCodec {
    max_message_bytes: usize,
    hash_functions: usize,
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_BYTES, IBF_DEFAULT_HASH_FUNCTIONS)
    }
}

impl WireCodec {
    /// `hash_functions` is the digest `k` every router in the domain uses.
    pub fn new(max_message_bytes: usize, hash_functions: usize) -> Self {
        Self {
            max_message_bytes,
            hash_functions: hash_functions.max(1),
        }
    }

    pub fn from_config(config: &DvConfig) -> Self {
        Self::new(config.max_message_bytes, config.ibf_hash_functions)
    }

    pub fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_limit(self.max_message_bytes as u64)
    }

    /// Encode a table. Deterministic for equal tables.
    pub fn encode(&self, table: &RoutingTable) -> Vec<u8> {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .serialize(&WireTable::from(table))
            .unwrap_or_default()
    }

    /// Encode a table, refusing output a receiver would reject as too large.
    pub fn try_encode(&self, table: &RoutingTable) -> Result<Vec<u8>, CodecError> {
        let bytes = self.encode(table);
        if bytes.len() > self.max_message_bytes {
            return Err(CodecError::TooLarge {
                size: bytes.len(),
                max: self.max_message_bytes,
            });
        }
        Ok(bytes)
    }

    /// Decode a table, degrading to an empty one on any error.
    pub fn decode(&self, bytes: &[u8]) -> RoutingTable {
        match self.try_decode(bytes) {
            Ok(table) => table,
            Err(error) => {
                warn!(%error, bytes = bytes.len(), "discarding malformed routing table");
                RoutingTable::new()
            }
        }
    }

    /// Decode a table, reporting why it was rejected.
    pub fn try_decode(&self, bytes: &[u8]) -> Result<RoutingTable, CodecError> {
        if bytes.len() > self.max_message_bytes {
            return Err(CodecError::TooLarge {
                size: bytes.len(),
                max: self.max_message_bytes,
            });
        }
        let wire: WireTable = self
            .options()
            .deserialize(bytes)
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        wire.into_table(self.hash_functions)
    }
}

/// [`WireCodec::encode`] with default limits.
pub fn encode(table: &RoutingTable) -> Vec<u8> {
    WireCodec::default().encode(table)
}

/// [`WireCodec::decode`] with default limits.
pub fn decode(bytes: &[u8]) -> RoutingTable {
    WireCodec::default().decode(bytes)
}
