//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** events the host feeds in, and the query API
//! - **Driven Ports (Outbound):** transport, event sink, clock, config source

pub mod inbound;
pub mod outbound;

pub use inbound::{FibEntry, InboundEvent, RoutingApi};
pub use outbound::{ConfigProvider, DvEvent, DvEventPublisher, DvTransport, TimeSource};
