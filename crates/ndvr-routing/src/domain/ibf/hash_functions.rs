//! Hash family for the invertible Bloom filter.
//!
//! Uses MurmurHash3 (x64, 128-bit) with the function index as the seed, so
//! `k` indices give `k` independent hash functions. The output is stable
//! across processes and platforms, which the path digest needs: two routers
//! must agree on which cells a router name occupies.

use std::io::Cursor;

/// Hash an element with the `index`-th member of the family.
///
/// Returns the lower 64 bits of the 128-bit digest.
pub fn indexed_hash(element: &[u8], index: u32) -> u64 {
    let mut cursor = Cursor::new(element);
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_x64_128(&mut cursor, index).unwrap_or(0);
    hash as u64
}

/// Cell slots and hash values for an element: `(hash mod size, hash)` for
/// each of the `k` functions.
pub fn slots(element: &[u8], k: usize, size: usize) -> impl Iterator<Item = (usize, u64)> + '_ {
    (0..k).map(move |i| {
        let hash = indexed_hash(element, i as u32);
        ((hash % size as u64) as usize, hash)
    })
}
