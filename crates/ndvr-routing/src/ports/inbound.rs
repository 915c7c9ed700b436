//! # Driving Ports (Inbound API)
//!
//! Everything the transport delivers reaches the engine as an
//! [`InboundEvent`], one at a time. Data arrives already validated: the
//! transport verifies signatures and reports failures as
//! [`InboundEvent::ValidationFailed`].

use crate::domain::{Cost, FaceId, RequestId, RoutingTable};
use crate::error::DvError;

/// Something the transport observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A neighbor's Hello (`<prefix>/hello/<network>/%C1.Router/<router>`)
    Hello { name: String, face_id: FaceId },
    /// A neighbor asks for our routing table
    AdvertisementRequest { name: String, face_id: FaceId },
    /// Validated reply to one of our advertisement requests
    AdvertisementData { request_id: RequestId, payload: Vec<u8> },
    /// Reply to one of our requests failed validation
    ValidationFailed { request_id: RequestId, reason: String },
    /// The transport gave up waiting for a reply
    Timeout { request_id: RequestId },
    /// The transport reported the neighbor unreachable
    Nack { request_id: RequestId, reason: String },
    /// A neighbor fetches our signing key
    KeyRequest { name: String },
}

/// One forwarding entry derived from the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FibEntry {
    pub prefix: String,
    /// Selected neighbor
    pub next_hop: String,
    /// Face the neighbor is reached through
    pub face_id: FaceId,
    pub cost: Cost,
}

/// Primary API of the routing engine.
pub trait RoutingApi {
    /// Process one inbound event.
    fn handle(&mut self, event: InboundEvent);

    /// Copy of the current routing table.
    fn routing_table(&self) -> RoutingTable;

    /// Best next hop per learned prefix, for the forwarder.
    fn fib_entries(&self) -> Vec<FibEntry>;

    /// Start originating a prefix. Returns its sequence number.
    fn announce_prefix(&mut self, prefix: &str) -> Result<u64, DvError>;

    /// Stop originating a prefix. Returns false if we did not originate it.
    fn withdraw_prefix(&mut self, prefix: &str) -> bool;
}
