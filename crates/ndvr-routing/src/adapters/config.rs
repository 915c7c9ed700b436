//! Configuration providers.
//!
//! - `StaticConfigProvider` - config built in code
//! - `TomlConfigProvider` - config file loading (requires "toml-config" feature)

use crate::domain::DvConfig;
use crate::error::ConfigError;
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider.
///
/// Useful for testing and development. For production, use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: DvConfig,
}

impl StaticConfigProvider {
    /// Create with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DvConfig::default(),
        }
    }

    /// Create with specified config.
    #[must_use]
    pub fn with_config(mut self, config: DvConfig) -> Self {
        self.config = config;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn dv_config(&self) -> Result<DvConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

// ============================================================================
// TomlConfigProvider - Production Config Loading (requires "toml-config")
// ============================================================================

#[cfg(feature = "toml-config")]
mod toml_config {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;

    #[derive(Debug, Deserialize)]
    struct ConfigFile {
        #[serde(default)]
        router: RouterSection,
        #[serde(default)]
        timers: TimersSection,
        #[serde(default)]
        ibf: IbfSection,
    }

    #[derive(Debug, Deserialize, Default)]
    struct RouterSection {
        protocol_prefix: Option<String>,
        network: Option<String>,
        name: Option<String>,
        #[serde(default)]
        prefixes: Vec<String>,
        link_cost: Option<u32>,
        max_message_bytes: Option<usize>,
    }

    #[derive(Debug, Deserialize, Default)]
    struct TimersSection {
        hello_interval_initial_secs: Option<u64>,
        hello_interval_max_secs: Option<u64>,
        local_rt_interval_secs: Option<u64>,
        local_rt_timeout_secs: Option<u64>,
        max_request_attempts: Option<u32>,
        retry_backoff_secs: Option<u64>,
        retry_backoff_max_secs: Option<u64>,
        neighbor_timeout_secs: Option<u64>,
    }

    #[derive(Debug, Deserialize, Default)]
    struct IbfSection {
        size: Option<usize>,
        hash_functions: Option<usize>,
    }

    /// TOML-based configuration provider.
    ///
    /// Missing keys take the [`DvConfig::default`] values.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [router]
    /// protocol_prefix = "/ndvr"
    /// network = "ufba"
    /// name = "Router1"
    /// prefixes = ["/ufba/video", "/ufba/chat"]
    /// link_cost = 1
    /// max_message_bytes = 65536
    ///
    /// [timers]
    /// hello_interval_initial_secs = 1
    /// hello_interval_max_secs = 60
    /// local_rt_interval_secs = 5
    /// local_rt_timeout_secs = 1
    /// max_request_attempts = 3
    /// retry_backoff_secs = 1
    /// retry_backoff_max_secs = 8
    /// neighbor_timeout_secs = 180
    ///
    /// [ibf]
    /// size = 50
    /// hash_functions = 3
    /// ```
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        config: DvConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if file cannot be read or parsed.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                error: e.to_string(),
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let defaults = DvConfig::default();
            let ConfigFile {
                router,
                timers,
                ibf,
            } = file;

            let config = DvConfig {
                protocol_prefix: router.protocol_prefix.unwrap_or(defaults.protocol_prefix),
                network: router.network.unwrap_or(defaults.network),
                router_name: router.name.unwrap_or(defaults.router_name),
                local_prefixes: router.prefixes,
                hello_interval_initial_secs: timers
                    .hello_interval_initial_secs
                    .unwrap_or(defaults.hello_interval_initial_secs),
                hello_interval_max_secs: timers
                    .hello_interval_max_secs
                    .unwrap_or(defaults.hello_interval_max_secs),
                local_rt_interval_secs: timers
                    .local_rt_interval_secs
                    .unwrap_or(defaults.local_rt_interval_secs),
                local_rt_timeout_secs: timers
                    .local_rt_timeout_secs
                    .unwrap_or(defaults.local_rt_timeout_secs),
                max_request_attempts: timers
                    .max_request_attempts
                    .unwrap_or(defaults.max_request_attempts),
                retry_backoff_secs: timers
                    .retry_backoff_secs
                    .unwrap_or(defaults.retry_backoff_secs),
                retry_backoff_max_secs: timers
                    .retry_backoff_max_secs
                    .unwrap_or(defaults.retry_backoff_max_secs),
                neighbor_timeout_secs: timers
                    .neighbor_timeout_secs
                    .unwrap_or(defaults.neighbor_timeout_secs),
                default_link_cost: router.link_cost.unwrap_or(defaults.default_link_cost),
                ibf_size: ibf.size.unwrap_or(defaults.ibf_size),
                ibf_hash_functions: ibf.hash_functions.unwrap_or(defaults.ibf_hash_functions),
                max_message_bytes: router
                    .max_message_bytes
                    .unwrap_or(defaults.max_message_bytes),
            };

            Ok(Self { config })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn dv_config(&self) -> Result<DvConfig, ConfigError> {
            self.config.validate()?;
            Ok(self.config.clone())
        }
    }
}

#[cfg(feature = "toml-config")]
pub use toml_config::TomlConfigProvider;
