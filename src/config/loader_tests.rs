//! Tests for configuration file loading.

use super::*;
use crate::model::{PageSize, PaginationType, SortKey};
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_contains_storefeed_config_toml() {
    let Some(path) = default_config_path() else {
        return;
    };
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("storefeed") && path_str.ends_with("config.toml"),
        "Path should contain 'storefeed' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = env::temp_dir().join("storefeed_test_config.toml");

    let toml_content = r#"
max_request_batch = 40
search_debounce_ms = 150

[surfaces.products]
version = 2
paginationType = "infinite"
pageSize = 20

[surfaces.orders]
showPagination = true
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.max_request_batch, Some(40));
    assert_eq!(config.search_debounce_ms, Some(150));
    assert_eq!(config.surfaces.len(), 2);
    assert_eq!(
        config.surfaces["products"].pagination_type.as_deref(),
        Some("infinite")
    );

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = env::temp_dir().join("storefeed_test_invalid.toml");
    fs::write(&config_path, "this is not valid TOML ][}{").expect("Failed to write invalid test config");

    let result = load_config_file(&config_path);
    match result {
        Err(ConfigError::ParseError { path, reason: _ }) => {
            assert_eq!(path, config_path);
        }
        _ => panic!("Expected ParseError, got {:?}", result),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("theme = \"dark\"");
    assert!(result.is_err(), "Unknown top-level keys should be rejected");

    let result: Result<ConfigFile, _> = toml::from_str("[surfaces.products]\nlayout = \"grid\"");
    assert!(result.is_err(), "Unknown surface keys should be rejected");
}

// ===== merge_config =====

#[test]
fn merge_config_uses_defaults_when_none() {
    let resolved = merge_config(None).unwrap();
    assert_eq!(resolved, ResolvedConfig::default());
    assert_eq!(resolved.max_request_batch, DEFAULT_MAX_BATCH);
}

#[test]
fn merge_config_normalises_surface_settings() {
    let config: ConfigFile = toml::from_str(
        r#"
[surfaces.wishlist]
showPagination = false

[surfaces.products]
paginationType = "pages"
pageSize = 40
defaultSort = "newest"
"#,
    )
    .unwrap();

    let resolved = merge_config(Some(config)).unwrap();
    let wishlist = resolved.settings_for(ListingSurface::WishlistItems);
    assert_eq!(wishlist.pagination_type, PaginationType::InfiniteScroll);

    let products = resolved.settings_for(ListingSurface::Products);
    assert_eq!(products.pagination_type, PaginationType::Paginated);
    assert_eq!(products.page_size, PageSize::new(40).unwrap());
    assert_eq!(products.default_sort, SortKey::Newest);
}

#[test]
fn settings_for_unconfigured_surface_are_defaults() {
    let resolved = merge_config(Some(ConfigFile::default())).unwrap();
    assert_eq!(
        resolved.settings_for(ListingSurface::Posts),
        ListingSettings::defaults_for(ListingSurface::Posts)
    );
}

#[test]
fn merge_config_rejects_unknown_surface() {
    let config: ConfigFile = toml::from_str("[surfaces.gadgets]\nshowPagination = true").unwrap();
    assert_eq!(
        merge_config(Some(config)),
        Err(ConfigError::UnknownSurface("gadgets".to_string()))
    );
}

#[test]
fn merge_config_reports_settings_errors_with_surface() {
    let config: ConfigFile = toml::from_str("[surfaces.posts]\nversion = 9").unwrap();
    assert_eq!(
        merge_config(Some(config)),
        Err(ConfigError::Settings {
            surface: ListingSurface::Posts,
            source: SettingsError::UnsupportedVersion(9),
        })
    );
}

#[test]
fn merge_config_clamps_zero_batch() {
    let config = ConfigFile {
        max_request_batch: Some(0),
        ..ConfigFile::default()
    };
    assert_eq!(merge_config(Some(config)).unwrap().max_request_batch, 1);
}

// ===== Environment overrides =====

#[test]
#[serial(storefeed_env)]
fn apply_env_overrides_reads_batch_and_debounce() {
    env::set_var(MAX_BATCH_ENV, "25");
    env::set_var(DEBOUNCE_ENV, "80");

    let config = apply_env_overrides(ResolvedConfig::default()).unwrap();

    env::remove_var(MAX_BATCH_ENV);
    env::remove_var(DEBOUNCE_ENV);

    assert_eq!(config.max_request_batch, 25);
    assert_eq!(config.search_debounce_ms, 80);
}

#[test]
#[serial(storefeed_env)]
fn apply_env_overrides_rejects_zero_batch() {
    env::set_var(MAX_BATCH_ENV, "0");
    let result = apply_env_overrides(ResolvedConfig::default());
    env::remove_var(MAX_BATCH_ENV);

    assert_eq!(
        result,
        Err(ConfigError::InvalidEnv {
            var: MAX_BATCH_ENV,
            value: "0".to_string(),
        })
    );
}

#[test]
#[serial(storefeed_env)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    env::remove_var(MAX_BATCH_ENV);
    env::remove_var(DEBOUNCE_ENV);

    let config = apply_env_overrides(ResolvedConfig::default()).unwrap();
    assert_eq!(config, ResolvedConfig::default());
}

// ===== Config file precedence =====

#[test]
#[serial(storefeed_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let explicit = env::temp_dir().join("storefeed_explicit.toml");
    let from_env = env::temp_dir().join("storefeed_env.toml");
    fs::write(&explicit, "max_request_batch = 11").unwrap();
    fs::write(&from_env, "max_request_batch = 22").unwrap();
    env::set_var(CONFIG_ENV, &from_env);

    let config = load_config_with_precedence(Some(explicit.clone())).unwrap();

    env::remove_var(CONFIG_ENV);
    fs::remove_file(explicit).ok();
    fs::remove_file(from_env).ok();

    assert_eq!(config.unwrap().max_request_batch, Some(11));
}

#[test]
#[serial(storefeed_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let from_env = env::temp_dir().join("storefeed_env_only.toml");
    fs::write(&from_env, "search_debounce_ms = 5").unwrap();
    env::set_var(CONFIG_ENV, &from_env);

    let config = load_config_with_precedence(None).unwrap();

    env::remove_var(CONFIG_ENV);
    fs::remove_file(from_env).ok();

    assert_eq!(config.unwrap().search_debounce_ms, Some(5));
}

// ===== CLI overrides =====

#[test]
fn apply_cli_overrides_takes_precedence() {
    let config = ResolvedConfig {
        max_request_batch: 25,
        ..ResolvedConfig::default()
    };
    let config = apply_cli_overrides(config, Some(7), Some(0));
    assert_eq!(config.max_request_batch, 7);
    assert_eq!(config.search_debounce_ms, 0);
}

#[test]
fn apply_cli_overrides_none_keeps_values() {
    let base = ResolvedConfig::default();
    assert_eq!(apply_cli_overrides(base.clone(), None, None), base);
}
