//! Configuration module.
//!
//! - [`loader`]: config file discovery and precedence (CLI > env > file > defaults)
//! - [`settings`]: stored listing settings normalised to one canonical shape

pub mod loader;
pub mod settings;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};
pub use settings::{normalize, ListingSettings, RawListingSettings, SettingsError};
