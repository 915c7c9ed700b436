//! # Named-Data Distance-Vector Routing
//!
//! A distance-vector routing engine for named-data networks. Routers find
//! each other with periodic Hello broadcasts, pull each other's routing
//! tables with signed request/response exchanges, and merge what they learn
//! into a table of name prefixes. Each route carries an Invertible Bloom
//! Filter digest of the routers on its path, so a router can recognize and
//! refuse routes that would loop back through itself.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** cost, path digests, routing table merge, neighbors, timers
//! - **Codec:** bincode wire format for advertised tables
//! - **Ports Layer:** inbound events and API, outbound transport/clock/events
//! - **Service Layer:** [`DvEngine`], the single-threaded protocol state machine
//! - **Adapters Layer:** publishers, config providers, system clock, tokio runner
//!
//! ## Feature Flags
//!
//! - `runtime` - tokio event loop ([`adapters::runtime::EngineRunner`])
//! - `toml-config` - TOML configuration provider
//! - `telemetry` - `tracing-subscriber` setup
//! - `test-utils` - deterministic clocks and a recording transport
//!
//! ## Example
//!
//! ```rust
//! use ndvr_routing::{Cost, MergeContext, NextHop, RoutingEntry, RoutingTable};
//! use ndvr_routing::InvertibleBloomFilter;
//!
//! let mut advertised = RoutingTable::new();
//! advertised.insert(
//!     RoutingEntry::new("/ufba/video", 1, "/ufba/%C1.Router/Router2").with_next_hop(
//!         NextHop::new("/ufba/%C1.Router/Router3", Cost::new(5), InvertibleBloomFilter::default()),
//!     ),
//! );
//!
//! let mut table = RoutingTable::new();
//! let ctx = MergeContext {
//!     local_router: "/ufba/%C1.Router/Router1",
//!     neighbor: "/ufba/%C1.Router/Router2",
//!     link_cost: Cost::new(1),
//! };
//! let report = table.merge_advertisement(&ctx, &advertised);
//!
//! assert_eq!(report.accepted, 1);
//! assert_eq!(table.get("/ufba/video").unwrap().best_cost(), Cost::new(6));
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod codec;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// =============================================================================
// ADAPTERS
// =============================================================================

pub mod adapters;

/// Logging setup. Requires feature: `telemetry`
#[cfg(feature = "telemetry")]
pub mod telemetry;

/// Test utilities. Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use codec::{decode, encode, WireCodec};
pub use domain::{
    router_prefix, ControlName, Cost, DvConfig, FaceId, HelloSchedule, InvertibleBloomFilter,
    MergeContext, MergeReport, MessageType, NeighborEntry, NeighborMap, NeighborState, NextHop,
    RequestId, RoutingEntry, RoutingTable, Timestamp,
};
pub use error::{CodecError, ConfigError, DvError, IbfError, NameError, TransportError};
pub use metrics::{DvMetrics, DvMetricsSnapshot};
pub use ports::{
    ConfigProvider, DvEvent, DvEventPublisher, DvTransport, FibEntry, InboundEvent, RoutingApi,
    TimeSource,
};
pub use service::DvEngine;

pub use adapters::{InMemoryEventPublisher, NoOpEventPublisher, StaticConfigProvider, SystemTimeSource};

#[cfg(feature = "runtime")]
pub use adapters::EngineRunner;

#[cfg(feature = "toml-config")]
pub use adapters::TomlConfigProvider;

#[cfg(feature = "telemetry")]
pub use telemetry::{init_logging, LoggingConfig};
