//! Invertible Bloom Filter used as a path digest.
//!
//! Each next hop carries an IBF over the router names on its path. A
//! receiving router asks `contains(own_name)` to detect that an advertised
//! path already runs through it, without the sender shipping the path list.
//!
//! Cells are XOR accumulators, so `remove` is the same pass as `insert` and
//! undoes it exactly. Membership is approximate:
//! - an inserted element tests positive unless another element XORed into one
//!   of its cells (a cancellation);
//! - false positives become more likely as `count / size` grows.
//! Callers treat the answer as a hint, never as ground truth.

mod hash_functions;

pub use hash_functions::{indexed_hash, slots};

use crate::error::IbfError;

/// Default number of cells.
pub const IBF_DEFAULT_SIZE: usize = 50;

/// Default number of hash functions.
pub const IBF_DEFAULT_HASH_FUNCTIONS: usize = 3;

/// Fixed-capacity XOR-cell set summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvertibleBloomFilter {
    /// XOR accumulators, one per cell
    cells: Vec<u64>,
    /// Number of hash functions (k)
    hash_functions: usize,
    /// Inserted minus removed elements
    count: u32,
}

impl InvertibleBloomFilter {
    /// Create an empty filter with `size` cells and `k` hash functions.
    ///
    /// Both values are raised to at least 1.
    pub fn new(size: usize, k: usize) -> Self {
        Self {
            cells: vec![0; size.max(1)],
            hash_functions: k.max(1),
            count: 0,
        }
    }

    /// Rebuild a filter from its transmitted parts.
    pub fn from_parts(cells: Vec<u64>, k: usize, count: u32) -> Result<Self, IbfError> {
        if cells.is_empty() {
            return Err(IbfError::NoCells);
        }
        if k == 0 {
            return Err(IbfError::NoHashFunctions);
        }
        Ok(Self {
            cells,
            hash_functions: k,
            count,
        })
    }

    /// XOR the element into its `k` cells.
    pub fn insert(&mut self, element: impl AsRef<[u8]>) {
        self.toggle(element.as_ref());
        self.count = self.count.saturating_add(1);
    }

    /// Undo a previous [`insert`](Self::insert).
    ///
    /// **Note**: Only call for an element that was inserted and not yet
    /// removed. Removing anything else corrupts the cells silently.
    pub fn remove(&mut self, element: impl AsRef<[u8]>) {
        self.toggle(element.as_ref());
        self.count = self.count.saturating_sub(1);
    }

    /// Approximate membership test.
    pub fn contains(&self, element: impl AsRef<[u8]>) -> bool {
        slots(element.as_ref(), self.hash_functions, self.cells.len())
            .all(|(slot, hash)| self.cells[slot] & hash == hash)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of elements currently summarized.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Number of cells.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn hash_functions(&self) -> usize {
        self.hash_functions
    }

    /// Cell values in slot order (the wire digest).
    pub fn cells(&self) -> &[u64] {
        &self.cells
    }

    /// Elements per cell; false positives rise with this value.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.cells.len() as f64
    }

    fn toggle(&mut self, element: &[u8]) {
        let size = self.cells.len();
        for (slot, hash) in slots(element, self.hash_functions, size) {
            self.cells[slot] ^= hash;
        }
    }
}

impl Default for InvertibleBloomFilter {
    fn default() -> Self {
        Self::new(IBF_DEFAULT_SIZE, IBF_DEFAULT_HASH_FUNCTIONS)
    }
}
