//! # NDVR Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks (digest, merge, codec)
//! └── src/integration/  # several engines over an in-process network
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ndvr-tests
//! cargo bench -p ndvr-tests
//! ```

pub mod integration;
