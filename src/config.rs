// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the bot verdict service.
//!
//! Every field has a default so a partial JSON file (or none at all) yields a
//! working service. Environment variables are applied on top of the file.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Configuration for the bot verdict service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Signature and blocklist configuration
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Sliding-window traffic configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Network-identity resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Cross-origin configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// User-Agent signatures and provider blocklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Regular expressions tested against the lower-cased User-Agent
    #[serde(default = "default_user_agent_patterns")]
    pub user_agent_patterns: Vec<String>,

    /// Organization substrings identifying hosting, cloud, CDN and VPN providers
    #[serde(default = "default_blocklist")]
    pub blocklist: Vec<String>,
}

/// Sliding-window traffic limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Length of the trailing window in seconds (default: 30)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Requests allowed inside one window before a source is flagged (default: 10)
    #[serde(default = "default_threshold")]
    pub threshold: usize,

    /// Interval between idle-source sweeps in seconds (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// ipinfo-compatible resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base URL of the lookup service (default: https://ipinfo.io)
    #[serde(default = "default_resolver_base_url")]
    pub base_url: String,

    /// API token appended as `?token=`
    #[serde(default)]
    pub token: Option<String>,

    /// Per-lookup timeout in milliseconds (default: 2000)
    #[serde(default = "default_resolver_timeout_ms")]
    pub timeout_ms: u64,
}

/// CORS configuration.
///
/// The default allows only `https://localhost`, which suits local
/// development. Deployments must list their front-end origins through
/// `ALLOWED_ORIGINS` or the config file; other origins get no CORS grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the endpoint from a browser
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_user_agent_patterns() -> Vec<String> {
    ["bot", "scraper", "crawl", "spider", "httpclient", "python", "curl", "wget"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_blocklist() -> Vec<String> {
    [
        "google llc",
        "microsoft corporation",
        "amazon",
        "digitalocean",
        "hetzner",
        "ovh",
        "linode",
        "akamai",
        "cloudflare",
        "alibaba",
        "oracle",
        "vultr",
        "choopa",
        "m247",
        "datacamp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_window_secs() -> u64 {
    30
}

fn default_threshold() -> usize {
    10
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_resolver_base_url() -> String {
    "https://ipinfo.io".to_string()
}

fn default_resolver_timeout_ms() -> u64 {
    2000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["https://localhost".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            detection: DetectionConfig::default(),
            rate_limit: RateLimitConfig::default(),
            resolver: ResolverConfig::default(),
            cors: CorsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            user_agent_patterns: default_user_agent_patterns(),
            blocklist: default_blocklist(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            threshold: default_threshold(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_resolver_base_url(),
            token: None,
            timeout_ms: default_resolver_timeout_ms(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the trailing window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl ResolverConfig {
    /// Get the lookup timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from `CONFIG_FILE` (if set) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Values that fail to parse are ignored and the previous setting kept.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(secs) = lookup("WINDOW_SECS").and_then(|v| v.parse().ok()) {
            self.rate_limit.window_secs = secs;
        }
        if let Some(threshold) = lookup("TRAFFIC_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.rate_limit.threshold = threshold;
        }
        if let Some(token) = lookup("IPINFO_TOKEN").filter(|t| !t.is_empty()) {
            self.resolver.token = Some(token);
        }
        if let Some(base_url) = lookup("IPINFO_BASE_URL") {
            self.resolver.base_url = base_url;
        }
        if let Some(ms) = lookup("RESOLVER_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.resolver.timeout_ms = ms;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
    }

    /// Parse the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.bind_addr.clone()))
    }
}
