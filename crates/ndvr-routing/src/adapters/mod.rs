//! # Adapters
//!
//! Concrete implementations of the outbound ports.
//!
//! - `publisher` - event sinks (no-op, in-memory)
//! - `config` - static and TOML configuration providers
//! - `time` - system clock
//! - `runtime` - tokio event loop (requires "runtime" feature)

pub mod config;
pub mod publisher;
pub mod time;

#[cfg(feature = "runtime")]
pub mod runtime;

pub use config::StaticConfigProvider;
#[cfg(feature = "toml-config")]
pub use config::TomlConfigProvider;
pub use publisher::{InMemoryEventPublisher, NoOpEventPublisher};
#[cfg(feature = "runtime")]
pub use runtime::EngineRunner;
pub use time::SystemTimeSource;
