//! # Integration Scenarios
//!
//! Several engines wired together through an in-process network.

pub mod convergence;
pub mod network;
