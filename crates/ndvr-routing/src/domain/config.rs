//! Engine configuration.

use crate::domain::{router_prefix, Cost, IBF_DEFAULT_HASH_FUNCTIONS, IBF_DEFAULT_SIZE};
use crate::error::ConfigError;

/// Default protocol prefix for control names.
pub const DEFAULT_PROTOCOL_PREFIX: &str = "/ndvr";

/// Default cap on an encoded advertisement (64 KiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Routing engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DvConfig {
    /// Control name prefix (default: /ndvr)
    pub protocol_prefix: String,
    /// Network name component, e.g. `ufba`
    pub network: String,
    /// Local router name component, e.g. `Router1`
    pub router_name: String,
    /// Prefixes this router originates
    pub local_prefixes: Vec<String>,
    /// First Hello interval and the value a topology change resets to (default: 1)
    pub hello_interval_initial_secs: u64,
    /// Back-off ceiling for the Hello interval (default: 60)
    pub hello_interval_max_secs: u64,
    /// Period of local re-origination and neighbor polling (default: 5)
    pub local_rt_interval_secs: u64,
    /// How long one advertisement request may stay unanswered (default: 1)
    pub local_rt_timeout_secs: u64,
    /// Attempts per poll before a neighbor is marked stale (default: 3)
    pub max_request_attempts: u32,
    /// First retry delay; doubles per attempt (default: 1)
    pub retry_backoff_secs: u64,
    /// Retry delay ceiling (default: 8)
    pub retry_backoff_max_secs: u64,
    /// Silence after which a neighbor is evicted (default: 180)
    pub neighbor_timeout_secs: u64,
    /// Cost of every link (default: 1)
    pub default_link_cost: u32,
    /// Path digest cells (default: 50)
    pub ibf_size: usize,
    /// Path digest hash functions (default: 3)
    pub ibf_hash_functions: usize,
    /// Largest advertisement accepted or produced (default: 64 KiB)
    pub max_message_bytes: usize,
}

impl Default for DvConfig {
    fn default() -> Self {
        Self {
            protocol_prefix: DEFAULT_PROTOCOL_PREFIX.to_string(),
            network: "ndn".to_string(),
            router_name: "router".to_string(),
            local_prefixes: Vec::new(),
            hello_interval_initial_secs: 1,
            hello_interval_max_secs: 60,
            local_rt_interval_secs: 5,
            local_rt_timeout_secs: 1,
            max_request_attempts: 3,
            retry_backoff_secs: 1,
            retry_backoff_max_secs: 8,
            neighbor_timeout_secs: 180,
            default_link_cost: 1,
            ibf_size: IBF_DEFAULT_SIZE,
            ibf_hash_functions: IBF_DEFAULT_HASH_FUNCTIONS,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl DvConfig {
    /// Config for a named router, defaults elsewhere.
    pub fn new(network: impl Into<String>, router_name: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            router_name: router_name.into(),
            ..Self::default()
        }
    }

    /// Create a config suitable for testing (short timers)
    pub fn for_testing(router_name: &str) -> Self {
        Self {
            network: "test".to_string(),
            router_name: router_name.to_string(),
            hello_interval_initial_secs: 1,
            hello_interval_max_secs: 8,
            local_rt_interval_secs: 5,
            local_rt_timeout_secs: 1,
            max_request_attempts: 2,
            retry_backoff_secs: 1,
            retry_backoff_max_secs: 2,
            neighbor_timeout_secs: 30,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_local_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Our identity: `/<network>/%C1.Router/<router_name>`.
    pub fn router_prefix(&self) -> String {
        router_prefix(&self.network, &self.router_name)
    }

    pub fn link_cost(&self) -> Cost {
        Cost::new(self.default_link_cost)
    }

    /// Retry delay before attempt `attempt + 1` (attempt counts from 1).
    pub fn retry_delay_secs(&self, attempt: u32) -> u64 {
        let shift = attempt.saturating_sub(1).min(32);
        self.retry_backoff_secs
            .saturating_mul(1u64 << shift)
            .min(self.retry_backoff_max_secs)
    }

    /// Check the constraints the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.router_name.trim_matches('/').is_empty() {
            return Err(ConfigError::EmptyRouterName);
        }

        let non_zero: [(&'static str, u64); 9] = [
            ("hello_interval_initial_secs", self.hello_interval_initial_secs),
            ("local_rt_interval_secs", self.local_rt_interval_secs),
            ("local_rt_timeout_secs", self.local_rt_timeout_secs),
            ("max_request_attempts", u64::from(self.max_request_attempts)),
            ("retry_backoff_secs", self.retry_backoff_secs),
            ("neighbor_timeout_secs", self.neighbor_timeout_secs),
            ("ibf_size", self.ibf_size as u64),
            ("ibf_hash_functions", self.ibf_hash_functions as u64),
            ("max_message_bytes", self.max_message_bytes as u64),
        ];
        if let Some((field, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroValue { field: *field });
        }

        if self.hello_interval_initial_secs > self.hello_interval_max_secs {
            return Err(ConfigError::HelloIntervalOrder {
                initial: self.hello_interval_initial_secs,
                max: self.hello_interval_max_secs,
            });
        }
        if self.neighbor_timeout_secs <= self.hello_interval_max_secs {
            return Err(ConfigError::NeighborTimeoutTooShort {
                timeout: self.neighbor_timeout_secs,
                hello_max: self.hello_interval_max_secs,
            });
        }
        Ok(())
    }
}
