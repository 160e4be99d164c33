//! Configuration file loading with precedence handling.

use super::settings::{normalize, ListingSettings, RawListingSettings, SettingsError};
use crate::model::ListingSurface;
use crate::state::{DEFAULT_MAX_BATCH, DEFAULT_SEARCH_DEBOUNCE};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "STOREFEED_CONFIG";
/// Environment variable overriding `max_request_batch`.
pub const MAX_BATCH_ENV: &str = "STOREFEED_MAX_BATCH";
/// Environment variable overriding `search_debounce_ms`.
pub const DEBOUNCE_ENV: &str = "STOREFEED_DEBOUNCE_MS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// `[surfaces.<name>]` names no known surface.
    #[error("Unknown surface {0:?} in config")]
    UnknownSurface(String),

    /// A surface's listing settings failed to normalise.
    #[error("Invalid settings for surface {surface}: {source}")]
    Settings {
        /// Surface the settings belong to.
        surface: ListingSurface,
        /// Underlying problem.
        source: SettingsError,
    },

    /// An override environment variable holds an unusable value.
    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/storefeed/config.toml`:
///
/// ```toml
/// max_request_batch = 50
/// search_debounce_ms = 250
///
/// [surfaces.products]
/// version = 2
/// paginationType = "infinite"
/// pageSize = 20
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Upper bound on items per collaborator batch.
    #[serde(default)]
    pub max_request_batch: Option<usize>,

    /// Search debounce quiet period in milliseconds.
    #[serde(default)]
    pub search_debounce_ms: Option<u64>,

    /// Stored listing settings per surface name.
    #[serde(default)]
    pub surfaces: BTreeMap<String, RawListingSettings>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Upper bound on items per collaborator batch.
    pub max_request_batch: usize,
    /// Search debounce quiet period in milliseconds.
    pub search_debounce_ms: u64,
    /// Normalised settings for surfaces the file configures.
    pub surfaces: BTreeMap<ListingSurface, ListingSettings>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            log_file_path: default_log_path(),
            max_request_batch: DEFAULT_MAX_BATCH,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
            surfaces: BTreeMap::new(),
        }
    }
}

impl ResolvedConfig {
    /// Settings for `surface`, falling back to its built-in defaults.
    pub fn settings_for(&self, surface: ListingSurface) -> ListingSettings {
        self.surfaces
            .get(&surface)
            .cloned()
            .unwrap_or_else(|| ListingSettings::defaults_for(surface))
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/storefeed/storefeed.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("storefeed").join("storefeed.log")
    } else {
        PathBuf::from("storefeed.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/storefeed/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("storefeed").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `STOREFEED_CONFIG` environment variable
/// 3. Default path `~/.config/storefeed/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// Surface settings are normalised here, once, so nothing downstream sees the
/// stored shapes.
///
/// # Errors
///
/// Returns error for unknown surface names or settings that fail to normalise.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let mut surfaces = BTreeMap::new();
    for (name, raw) in &config.surfaces {
        let surface: ListingSurface = name
            .parse()
            .map_err(|_| ConfigError::UnknownSurface(name.clone()))?;
        let settings = normalize(surface, raw)
            .map_err(|source| ConfigError::Settings { surface, source })?;
        surfaces.insert(surface, settings);
    }

    Ok(ResolvedConfig {
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        max_request_batch: config
            .max_request_batch
            .unwrap_or(defaults.max_request_batch)
            .max(1),
        search_debounce_ms: config
            .search_debounce_ms
            .unwrap_or(defaults.search_debounce_ms),
        surfaces,
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `STOREFEED_MAX_BATCH`: Override `max_request_batch` (must be > 0)
/// - `STOREFEED_DEBOUNCE_MS`: Override `search_debounce_ms`
///
/// # Errors
///
/// Returns error if a set variable does not parse.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(value) = std::env::var(MAX_BATCH_ENV) {
        config.max_request_batch = value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|batch| *batch > 0)
            .ok_or(ConfigError::InvalidEnv {
                var: MAX_BATCH_ENV,
                value: value.clone(),
            })?;
    }

    if let Ok(value) = std::env::var(DEBOUNCE_ENV) {
        config.search_debounce_ms =
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidEnv {
                    var: DEBOUNCE_ENV,
                    value: value.clone(),
                })?;
    }

    Ok(config)
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    max_batch_override: Option<usize>,
    debounce_override: Option<u64>,
) -> ResolvedConfig {
    if let Some(batch) = max_batch_override {
        config.max_request_batch = batch.max(1);
    }

    if let Some(debounce) = debounce_override {
        config.search_debounce_ms = debounce;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
