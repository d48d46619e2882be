//! Configuration loading for the converter front end
//!
//! Resolution follows the same priority order everywhere:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default converter backend base URL (local development backend)
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Default listen port for the front-end service
pub const DEFAULT_PORT: u16 = 5810;

/// TOML configuration file contents
///
/// All fields optional; missing fields fall through to the next
/// resolution tier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Converter backend base URL
    pub backend_url: Option<String>,
    /// Listen port for this service
    pub port: Option<u16>,
    /// Directory containing the built browser frontend (served statically)
    pub static_dir: Option<String>,
}

impl TomlConfig {
    /// Load TOML config from an explicit path
    pub fn load(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))
    }

    /// Load TOML config from the default platform location, if present
    ///
    /// Linux: `~/.config/s2i/config.toml`, then `/etc/s2i/config.toml`.
    /// macOS/Windows: the platform config directory under `s2i/`.
    pub fn load_default() -> Self {
        for path in default_config_paths() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded TOML config");
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable TOML config");
                    }
                }
            }
        }
        Self::default()
    }
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("s2i").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/s2i/config.toml"));
    }
    paths
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub backend_url: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

/// Resolve the converter backend base URL
pub fn resolve_backend_url(cli_arg: Option<&str>, toml_config: &TomlConfig) -> String {
    if let Some(url) = cli_arg {
        return url.trim_end_matches('/').to_string();
    }
    if let Ok(url) = std::env::var("S2I_BACKEND_URL") {
        if !url.trim().is_empty() {
            return url.trim_end_matches('/').to_string();
        }
    }
    if let Some(url) = &toml_config.backend_url {
        return url.trim_end_matches('/').to_string();
    }
    DEFAULT_BACKEND_URL.to_string()
}

/// Resolve the listen port
pub fn resolve_port(cli_arg: Option<u16>, toml_config: &TomlConfig) -> Result<u16> {
    if let Some(port) = cli_arg {
        return Ok(port);
    }
    if let Ok(raw) = std::env::var("S2I_PORT") {
        return raw
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("S2I_PORT is not a valid port: {}", raw)));
    }
    Ok(toml_config.port.unwrap_or(DEFAULT_PORT))
}

/// Resolve full service configuration from CLI arguments and TOML
pub fn resolve_service_config(
    cli_backend_url: Option<&str>,
    cli_port: Option<u16>,
    toml_config: &TomlConfig,
) -> Result<ServiceConfig> {
    Ok(ServiceConfig {
        backend_url: resolve_backend_url(cli_backend_url, toml_config),
        port: resolve_port(cli_port, toml_config)?,
        static_dir: toml_config.static_dir.as_ref().map(PathBuf::from),
    })
}
