// Copyright 2025 Fedboard Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use fedboard_storage::StoreUri;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fedboard Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:8000")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            enable_cors: default_enable_cors(),
            cors_origins: vec![],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// `file://<dir>` or `memory://`
    #[serde(default = "default_storage_uri")]
    pub uri: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uri: default_storage_uri(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Verify session tokens (default: false for development)
    #[serde(default)]
    pub enabled: bool,

    /// HMAC secret the session tokens are signed with (required if enabled)
    pub jwt_secret: Option<String>,

    /// Cookie carrying the session token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Rate limiting of administrative routes
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            jwt_secret: None,
            cookie_name: default_cookie_name(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    /// Maximum requests per window
    #[serde(default = "default_rate_limit_max_requests")]
    pub max_requests: u32,

    /// Time window in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            max_requests: default_rate_limit_max_requests(),
            window_secs: default_rate_limit_window_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long the distinct client list is served from memory
    #[serde(default = "default_client_ids_ttl")]
    pub client_ids_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            client_ids_ttl_secs: default_client_ids_ttl(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_storage_uri() -> String {
    "file://./fedboard-data".to_string()
}

fn default_cookie_name() -> String {
    "session_token".to_string()
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_rate_limit_max_requests() -> u32 {
    100
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_client_ids_ttl() -> u64 {
    30
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - FEDBOARD_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:8000)
    /// - FEDBOARD_STORAGE_URI: store location (default: file://./fedboard-data)
    /// - FEDBOARD_AUTH_ENABLED: verify session tokens (default: false)
    /// - FEDBOARD_JWT_SECRET: session token secret
    pub fn from_env() -> Self {
        Self::merge_with_env(Self::default())
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = match config_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        Ok(Self::merge_with_env(config))
    }

    /// Overlay variables that are explicitly set
    fn merge_with_env(config: Self) -> Self {
        Self::merge_with(config, |key| std::env::var(key).ok())
    }

    fn merge_with(mut config: Self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = lookup("FEDBOARD_HTTP_ADDR") {
            config.server.listen_addr = addr;
        }
        if let Some(uri) = lookup("FEDBOARD_STORAGE_URI") {
            config.storage.uri = uri;
        }
        if let Some(enabled) = lookup("FEDBOARD_AUTH_ENABLED") {
            config.auth.enabled = enabled.parse().unwrap_or(false);
        }
        if let Some(secret) = lookup("FEDBOARD_JWT_SECRET") {
            config.auth.jwt_secret = Some(secret);
        }
        config
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.server
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address: {}", self.server.listen_addr))
    }

    pub fn store_uri(&self) -> Result<StoreUri> {
        Ok(self.storage.uri.parse::<StoreUri>()?)
    }

    pub fn client_ids_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.client_ids_ttl_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        self.store_uri()?;

        if self.auth.enabled && self.auth.jwt_secret.as_deref().map_or(true, str::is_empty) {
            anyhow::bail!("Authentication enabled but no JWT secret configured");
        }
        if self.auth.rate_limit.enabled
            && (self.auth.rate_limit.max_requests == 0 || self.auth.rate_limit.window_secs == 0)
        {
            anyhow::bail!("Rate limit needs a non-zero max_requests and window_secs");
        }

        Ok(())
    }
}
