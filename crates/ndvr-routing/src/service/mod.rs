//! # Routing Engine Service
//!
//! [`DvEngine`] wires the domain (routing table, neighbors, Hello back-off,
//! timers) to the outbound ports and implements [`RoutingApi`].
//!
//! [`RoutingApi`]: crate::ports::RoutingApi

// Semantic submodules
mod advertisement;
mod api;
mod core;
mod discovery;
mod maintenance;

pub use core::DvEngine;
