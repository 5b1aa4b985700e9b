//! Server configuration
//!
//! Every setting has a default, so the TOML file is optional and may set any
//! subset of sections:
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:5000"
//! timeout_ms = 30000
//!
//! [upload]
//! mode = "strict"        # or "lenient"
//! max_bytes = 10485760
//! min_paste_chars = 100
//!
//! [session]
//! ttl_minutes = 60
//!
//! [chat]
//! mode = "remote"        # or "offline"
//! reply_delay_ms = 1000
//!
//! [mock]
//! analysis_delay_ms = 2500
//! ```
//!
//! Command-line flags override file values.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use lexlens_core::bridge::DEFAULT_TTL_MINUTES;
use lexlens_core::client::DEFAULT_BACKEND_URL;
use lexlens_core::UploadPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub upload: UploadPolicy,
    pub session: SessionConfig,
    pub chat: ChatConfig,
    pub mock: MockConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse config TOML")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Unset means the default backend, or this server when the mock is on
    pub base_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 30_000,
        }
    }
}

impl BackendConfig {
    pub fn url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ttl_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.ttl_minutes)
    }
}

/// Where chat answers come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Forward to the backend's askQuestion endpoint
    #[default]
    Remote,
    /// Answer from the built-in keyword rules
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub mode: ChatMode,
    /// Offline mode only
    pub reply_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            mode: ChatMode::Remote,
            reply_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Simulated processing time for `/analyzeDocument`
    pub analysis_delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            analysis_delay_ms: 2500,
        }
    }
}

impl MockConfig {
    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }
}
