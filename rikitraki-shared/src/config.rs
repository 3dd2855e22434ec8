//! Configuration management for the RikiTraki client

use crate::{Result, TrackerError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the tracking-service client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// Backend location
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Request timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// URL scheme used to reach the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

/// Where the backend lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub server: String,
    pub port: u16,
    #[serde(default)]
    pub scheme: Scheme,
}

/// Timeouts applied to every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Whole-request timeout (seconds)
    pub request_secs: u64,

    /// TCP/TLS connect timeout (seconds)
    pub connect_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl std::str::FromStr for Scheme {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(TrackerError::Config(format!("Unsupported scheme: {other}"))),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1".to_string(),
            port: 3000,
            scheme: Scheme::Http,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ConnectionConfig {
    pub fn new(server: impl Into<String>, port: u16, scheme: Scheme) -> Self {
        Self {
            server: server.into(),
            port,
            scheme,
        }
    }

    /// Build a connection from a base URL such as `https://example.org:443`
    pub fn from_url(base: &str) -> Result<Self> {
        let parsed = url::Url::parse(base)?;
        let scheme = parsed.scheme().parse()?;
        let server = parsed
            .host_str()
            .ok_or_else(|| TrackerError::Config(format!("No host in URL: {base}")))?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| TrackerError::Config(format!("No port in URL: {base}")))?;

        Ok(Self {
            server,
            port,
            scheme,
        })
    }

    /// `scheme://server:port`
    pub fn base_url(&self) -> Result<url::Url> {
        let raw = format!("{}://{}:{}", self.scheme.as_str(), self.server, self.port);
        Ok(url::Url::parse(&raw)?)
    }
}

impl TimeoutConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl TrackerConfig {
    /// Load configuration from file or create default
    pub fn load_or_default(config_path: Option<&str>) -> Result<Self> {
        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config: TrackerConfig = serde_json::from_str(&content)?;
                config.validate()?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.connection.server.trim().is_empty() {
            return Err(TrackerError::Config("Server name is empty".to_string()));
        }
        if self.connection.port == 0 {
            return Err(TrackerError::Config("Port must be non-zero".to_string()));
        }
        if self.timeouts.request_secs == 0 {
            return Err(TrackerError::Config(
                "Request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Platform config location, e.g. `~/.config/rikitraki/config.json`
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "rikitraki", "rikitraki")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
