//! Domain Layer - Pure routing logic with no I/O
//!
//! - Route cost with saturating infinity
//! - Invertible Bloom Filter path digests
//! - Routing table and the distance-vector merge
//! - Neighbor sessions, Hello back-off, cancelable timers
//! - Control-message naming and engine configuration

pub mod config;
pub mod cost;
pub mod hello;
pub mod ibf;
pub mod naming;
pub mod neighbor;
pub mod routing_table;
pub mod scheduler;
pub mod value_objects;

pub use config::*;
pub use cost::*;
pub use hello::*;
pub use ibf::*;
pub use naming::*;
pub use neighbor::*;
pub use routing_table::*;
pub use scheduler::*;
pub use value_objects::*;
