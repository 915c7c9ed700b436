//! # Driven Ports (Outbound SPI)
//!
//! Adapters the engine needs from its host.

use crate::domain::{ControlName, Cost, DvConfig, FaceId, RequestId, Timestamp};
use crate::error::{ConfigError, TransportError};

/// Signed request/response transport.
///
/// At most one reply per request. Replies, timeouts, NACKs and validation
/// failures come back as [`InboundEvent`](crate::ports::InboundEvent)s
/// carrying the request id.
pub trait DvTransport: Send {
    /// Start receiving control messages under `prefix`.
    fn register_prefix(&mut self, prefix: &str) -> Result<(), TransportError>;

    /// Broadcast a Hello.
    fn send_hello(&mut self, name: &ControlName) -> Result<(), TransportError>;

    /// Ask a neighbor for its routing table.
    fn express_advertisement_request(
        &mut self,
        request_id: RequestId,
        name: &ControlName,
        face_id: FaceId,
        lifetime_secs: u64,
    ) -> Result<(), TransportError>;

    /// Forget an outstanding request; its reply must not be delivered.
    fn cancel_request(&mut self, request_id: RequestId);

    /// Answer a neighbor's advertisement request with our encoded table.
    fn reply_advertisement(
        &mut self,
        name: &str,
        face_id: FaceId,
        payload: Vec<u8>,
    ) -> Result<(), TransportError>;

    /// Answer a key request with our signing certificate.
    fn reply_key(&mut self, name: &str) -> Result<(), TransportError>;
}

/// Something observable changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DvEvent {
    NeighborDiscovered { neighbor: String, face_id: FaceId },
    NeighborStale { neighbor: String },
    NeighborRevived { neighbor: String },
    NeighborEvicted { neighbor: String },
    /// The selected route for a prefix changed
    RouteUpdated {
        prefix: String,
        next_hop: String,
        face_id: Option<FaceId>,
        cost: Cost,
    },
    /// No route is left for a prefix
    RouteWithdrawn { prefix: String },
    /// Our table no longer fits in one message; requests go unanswered
    AdvertisementTooLarge { size: usize, max: usize },
}

/// Event sink for the host (FIB updates, monitoring).
pub trait DvEventPublisher: Send + Sync {
    fn publish(&self, event: DvEvent) -> Result<(), String>;
}

/// Abstract interface for time operations.
///
/// Allows deterministic testing by injecting controlled time.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Abstract interface for configuration loading.
pub trait ConfigProvider: Send + Sync {
    fn dv_config(&self) -> Result<DvConfig, ConfigError>;
}
