//! Error types for the routing subsystem.
//!
//! Nothing here is process-fatal. Protocol-path failures (bad payloads,
//! validation failures, timeouts) are absorbed by the engine and surfaced
//! through logs, metrics and events; only setup-time failures are returned
//! to the embedder as [`DvError`].

use thiserror::Error;

/// Errors from the engine's setup and control API.
#[derive(Debug, Error)]
pub enum DvError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to register prefix {prefix}: {reason}")]
    Registration { prefix: String, reason: String },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid control name: {0}")]
    Name(#[from] NameError),
}

/// Configuration validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("hello interval initial ({initial}s) exceeds maximum ({max}s)")]
    HelloIntervalOrder { initial: u64, max: u64 },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("neighbor timeout ({timeout}s) must exceed the maximum hello interval ({hello_max}s)")]
    NeighborTimeoutTooShort { timeout: u64, hello_max: u64 },

    #[error("router name must not be empty")]
    EmptyRouterName,

    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Failures reported by the transport collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("prefix registration rejected: {0}")]
    RegistrationFailed(String),

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("transport closed")]
    Closed,
}

/// Control-message name parsing failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("name {0} is outside the protocol prefix")]
    WrongProtocolPrefix(String),

    #[error("name {0} has too few components")]
    TooShort(String),

    #[error("unknown message type {0}")]
    UnknownMessageType(String),

    #[error("missing router identity marker in {0}")]
    NotARouter(String),

    #[error("invalid version component {0}")]
    InvalidVersion(String),
}

/// Wire decoding failures. `decode` maps all of these to an empty table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("payload of {size} bytes exceeds limit of {max}")]
    TooLarge { size: usize, max: usize },

    #[error("duplicate prefix {0}")]
    DuplicatePrefix(String),

    #[error("duplicate next hop {id} for prefix {prefix}")]
    DuplicateNextHop { prefix: String, id: String },

    #[error("selected next hop {selected:?} for prefix {prefix} is not a cheapest next hop")]
    InvalidSelection {
        prefix: String,
        selected: Option<String>,
    },

    #[error("invalid path digest for {prefix} via {id}: {source}")]
    InvalidDigest {
        prefix: String,
        id: String,
        #[source]
        source: IbfError,
    },
}

/// Invalid IBF parameters.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum IbfError {
    #[error("digest has no cells")]
    NoCells,

    #[error("hash function count must be positive")]
    NoHashFunctions,
}

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("subscriber init failed: {0}")]
    Init(String),
}
