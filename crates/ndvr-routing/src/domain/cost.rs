//! Route cost with an infinity sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Additive route metric.
///
/// `u32::MAX` is the infinity sentinel: an unreachable prefix, or a
/// withdrawal when it appears in an advertisement. Arithmetic saturates at
/// the sentinel and never wraps past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cost(u32);

impl Cost {
    /// Unreachable.
    pub const INFINITY: Cost = Cost(u32::MAX);

    /// Cost of a locally originated prefix.
    pub const ZERO: Cost = Cost(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_infinite(&self) -> bool {
        self.0 == u32::MAX
    }

    /// Add a link cost, capping at [`Cost::INFINITY`].
    ///
    /// An infinite operand always yields infinity.
    pub fn saturating_add(self, other: Cost) -> Cost {
        if self.is_infinite() || other.is_infinite() {
            return Cost::INFINITY;
        }
        Cost(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
