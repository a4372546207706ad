//! Configuration types for the DDNS system
//!
//! This module defines all configuration structures used throughout the crate.
//! Loading (file, environment) is the daemon's job; the core only consumes a
//! validated [`DdnsConfig`] value.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Seconds to wait after a successful synchronization pass
    #[serde(default = "default_wait_interval_secs")]
    pub wait_interval_secs: u64,

    /// Seconds to wait after a failed synchronization pass
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    /// Metrics HTTP server settings
    #[serde(default)]
    pub metrics_server: MetricsServerConfig,

    /// Address discovery strategy
    pub address_source: Option<AddressSourceConfig>,

    /// DNS provider configuration
    pub provider: Option<ProviderConfig>,
}

impl DdnsConfig {
    /// Create a new configuration with defaults
    ///
    /// Neither an address source nor a provider is selected.
    pub fn new() -> Self {
        Self {
            wait_interval_secs: default_wait_interval_secs(),
            retry_interval_secs: default_retry_interval_secs(),
            metrics_server: MetricsServerConfig::default(),
            address_source: None,
            provider: None,
        }
    }

    /// Interval to sleep after a successful pass
    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait_interval_secs)
    }

    /// Interval to sleep after a failed pass
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.wait_interval_secs == 0 {
            return Err(crate::Error::config("Wait interval must be > 0"));
        }
        if self.retry_interval_secs == 0 {
            return Err(crate::Error::config("Retry interval must be > 0"));
        }

        self.metrics_server.validate()?;

        match &self.address_source {
            Some(source) => source.validate()?,
            None => {
                return Err(crate::Error::config(
                    "No address source was configured",
                ));
            }
        }

        match &self.provider {
            Some(provider) => provider.validate()?,
            None => return Err(crate::Error::config("No DNS provider was configured")),
        }

        Ok(())
    }
}

impl Default for DdnsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsServerConfig {
    /// Serve `/metrics` when true
    #[serde(default = "default_metrics_enable")]
    pub enable: bool,

    /// Host to listen on
    #[serde(default = "default_metrics_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl MetricsServerConfig {
    /// Validate the metrics server configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.enable && self.host.is_empty() {
            return Err(crate::Error::config("Metrics server host cannot be empty"));
        }
        Ok(())
    }

    /// Listen address in `host:port` form
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            enable: default_metrics_enable(),
            host: default_metrics_host(),
            port: default_metrics_port(),
        }
    }
}

/// Address source configuration
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AddressSourceConfig {
    /// Fixed address
    Static {
        /// Address returned on every pass
        address: String,
    },

    /// Address fetched from an HTTP endpoint
    Url {
        /// Host and path to query, without the scheme (e.g. "ifconfig.me/ip")
        url: String,

        /// Use https when true, http otherwise
        #[serde(default = "default_https")]
        https: bool,

        /// Skip TLS certificate verification
        #[serde(default)]
        insecure_skip_verify: bool,

        /// Pattern with exactly one capture group selecting the address,
        /// absent or empty to use the raw response body
        #[serde(default)]
        regex: Option<String>,

        /// Basic auth username
        #[serde(default)]
        username: Option<String>,

        /// Basic auth password
        #[serde(default)]
        password: Option<String>,
    },
}

impl AddressSourceConfig {
    /// Validate the address source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            AddressSourceConfig::Static { address } => {
                if address.is_empty() {
                    return Err(crate::Error::config("Static address cannot be empty"));
                }
                Ok(())
            }
            AddressSourceConfig::Url { url, .. } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Address source URL cannot be empty"));
                }
                if url.contains("://") {
                    return Err(crate::Error::config(
                        "Address source URL must not include a scheme, use the https flag",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the source type name
    pub fn type_name(&self) -> &'static str {
        match self {
            AddressSourceConfig::Static { .. } => "static",
            AddressSourceConfig::Url { .. } => "url",
        }
    }
}

// Custom Debug implementation that hides the basic auth password
impl std::fmt::Debug for AddressSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressSourceConfig::Static { address } => f
                .debug_struct("Static")
                .field("address", address)
                .finish(),
            AddressSourceConfig::Url {
                url,
                https,
                insecure_skip_verify,
                regex,
                username,
                password,
            } => f
                .debug_struct("Url")
                .field("url", url)
                .field("https", https)
                .field("insecure_skip_verify", insecure_skip_verify)
                .field("regex", regex)
                .field("username", username)
                .field("password", &password.as_ref().map(|_| "<REDACTED>"))
                .finish(),
        }
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token with DNS read and edit permissions
        api_token: String,
        /// Zone ID holding the records
        zone_id: String,
        /// A records to keep in sync
        records: Vec<String>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                zone_id,
                records,
            } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                if zone_id.is_empty() {
                    return Err(crate::Error::config("Cloudflare zone ID cannot be empty"));
                }
                if records.is_empty() {
                    return Err(crate::Error::config("No records configured"));
                }
                if records.iter().any(|r| r.trim().is_empty()) {
                    return Err(crate::Error::config("Record names cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }

    /// The record names managed by this provider
    pub fn records(&self) -> &[String] {
        match self {
            ProviderConfig::Cloudflare { records, .. } => records,
        }
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                zone_id, records, ..
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("zone_id", zone_id)
                .field("records", records)
                .finish(),
        }
    }
}

fn default_wait_interval_secs() -> u64 {
    60
}

fn default_retry_interval_secs() -> u64 {
    5
}

fn default_metrics_enable() -> bool {
    true
}

fn default_metrics_host() -> String {
    "0.0.0.0".to_string()
}

fn default_metrics_port() -> u16 {
    9097
}

fn default_https() -> bool {
    true
}
