//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.quorum-console/config.toml`. If missing on first run,
//! a commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QuorumConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    /// Accept self-signed certificates. The upstream server ships with a
    /// generated cert by default, so this is commonly needed on first setup.
    pub accept_invalid_certs: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConsoleConfig {
    pub poll_interval_secs: Option<u64>,
    /// Fragment to open on start, e.g. "#!consensus".
    pub start_fragment: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_URL: &str = "https://localhost:897";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server_url: String,
    pub accept_invalid_certs: bool,
    pub poll_interval_secs: u64,
    pub start_fragment: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.quorum-console/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".quorum-console").join("config.toml"))
}

/// Load config from `~/.quorum-console/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and returns
/// `QuorumConfig::default()`. If it exists but is malformed, returns
/// `ConfigError::Parse`.
pub fn load_config() -> Result<QuorumConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(QuorumConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(QuorumConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: QuorumConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r##"# Quorum Console Configuration
# All settings are optional; defaults are used for anything not set here.
# Override hierarchy: defaults, then this file, then env vars, then CLI flags.

# [server]
# base_url = "https://localhost:897"
# accept_invalid_certs = true        # The server ships a self-signed cert

# [console]
# poll_interval_secs = 30            # Pending-work poll interval
# start_fragment = "#!consensus"     # Page to open on start
"##;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars
/// → CLI. `cli_server` and `cli_fragment` come from CLI flags (None = not
/// specified).
pub fn resolve(
    config: &QuorumConfig,
    cli_server: Option<&str>,
    cli_fragment: Option<&str>,
) -> ResolvedConfig {
    // Server URL: CLI → env → config → default
    let server_url = cli_server
        .map(|s| s.to_string())
        .or_else(|| std::env::var("QUORUM_SERVER_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    // Start fragment: CLI → config (env makes no sense for a deep link)
    let start_fragment = cli_fragment
        .map(|s| s.to_string())
        .or_else(|| config.console.start_fragment.clone());

    ResolvedConfig {
        server_url,
        accept_invalid_certs: config.server.accept_invalid_certs.unwrap_or(false),
        poll_interval_secs: config
            .console
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        start_fragment,
    }
}
