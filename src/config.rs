//! Client configuration.
//!
//! Loaded from TOML with every field optional (missing fields fall back to
//! defaults), overridable from the environment, and adjustable through
//! builder methods in tests.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured base URL.
pub const ENV_API_URL: &str = "TASKLIGHT_API_URL";

/// Fallback ports probed during endpoint discovery.
///
/// The backend walks this range at startup when its preferred port is taken,
/// so the client walks the same range when the configured URL stops
/// answering.
pub const FALLBACK_PORTS: [u16; 6] = [8000, 8001, 8002, 8003, 8004, 8005];

/// Errors raised while loading or validating configuration.
///
/// Distinct from [`ApiError`](crate::error::ApiError), which describes
/// request failures; these never reach the request path.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Path that failed to open.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(String),

    /// A field holds a value the client cannot work with.
    #[error("{0}")]
    Invalid(String),
}

/// Top-level configuration for the Tasklight client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// HTTP transport settings.
    pub http: HttpConfig,
    /// Endpoint discovery settings.
    pub discovery: DiscoveryConfig,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base URL of the Tasklight API.
    pub base_url: String,
    /// Per-request timeout in seconds. Must be greater than zero.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Endpoint discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Whether the gateway may probe for a fallback endpoint after a
    /// connection failure.
    pub enabled: bool,
    /// Per-candidate probe timeout in seconds.
    pub probe_timeout_secs: u64,
    /// Ports to try on the configured host, in order.
    pub candidate_ports: Vec<u16>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_timeout_secs: 2,
            candidate_ports: FALLBACK_PORTS.to_vec(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// validation.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from defaults plus environment overrides.
    ///
    /// Reads [`ENV_API_URL`] for the base URL when set and non-blank.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_API_URL) {
            let url = url.trim();
            if !url.is_empty() {
                config.http.base_url = url.to_string();
            }
        }
        config
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.http.base_url = base_url.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.http.timeout_secs = secs;
        self
    }

    /// Enable or disable endpoint discovery.
    pub fn with_discovery(mut self, enabled: bool) -> Self {
        self.discovery.enabled = enabled;
        self
    }

    /// Override the candidate port list used by discovery.
    pub fn with_candidate_ports(mut self, ports: Vec<u16>) -> Self {
        self.discovery.candidate_ports = ports;
        self
    }

    /// Base URL with any trailing slash removed, so path joins are uniform.
    pub fn base_url(&self) -> &str {
        self.http.base_url.trim_end_matches('/')
    }

    /// Check the configuration for values the gateway cannot work with.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is not an absolute http(s) URL or
    /// a timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.discovery.probe_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "discovery.probe_timeout_secs must be greater than zero".to_string(),
            ));
        }
        let parsed = url::Url::parse(&self.http.base_url)
            .map_err(|e| ConfigError::Invalid(format!("invalid base URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "unsupported base URL scheme: {}",
                parsed.scheme()
            )));
        }
        Ok(())
    }
}
