//! Routing state: next hops, per-prefix entries and the table that holds
//! them, plus the distance-vector merge.

mod entry;
mod merge;
mod table;

pub use entry::{NextHop, RoutingEntry};
pub use merge::{MergeContext, MergeReport};
pub use table::RoutingTable;

#[cfg(test)]
mod tests;
