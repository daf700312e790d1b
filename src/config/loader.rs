//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix of every environment variable that overrides a config value.
pub const ENV_PREFIX: &str = "SPA_SERVER_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    Env { key: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay `SPA_SERVER_*` values onto `config`.
///
/// `lookup` receives the full variable name; pass `|key| std::env::var(key).ok()`
/// to read the process environment.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
    let flag = |name: &str| -> Result<Option<bool>, ConfigError> {
        match var(name) {
            None => Ok(None),
            Some(value) => parse_bool(&value).map(Some).ok_or_else(|| ConfigError::Env {
                key: format!("{ENV_PREFIX}{name}"),
                value,
            }),
        }
    };

    if let Some(addr) = var("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(roots) = var("ROOTS") {
        config.assets.roots = roots
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(PathBuf::from)
            .collect();
    }
    if let Some(base_url) = var("BASE_URL") {
        config.assets.base_url = base_url;
    }
    if let Some(pattern) = var("IMPORT_FALLBACK_REGEXP") {
        config.assets.import_fallback_regexp = pattern;
    }
    if let Some(level) = var("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(addr) = var("METRICS_ADDRESS") {
        config.observability.metrics_address = addr;
    }

    if let Some(v) = flag("ALLOW_SKIP_BASE_URL")? {
        config.assets.allow_skip_base_url = v;
    }
    if let Some(v) = flag("FALLBACK_DISABLED")? {
        config.assets.fallback_disabled = v;
    }
    if let Some(v) = flag("GZIP_DISABLED")? {
        config.assets.gzip_disabled = v;
    }
    if let Some(v) = flag("BROTLI_DISABLED")? {
        config.assets.brotli_disabled = v;
    }
    if let Some(v) = flag("JSON_LOGGING")? {
        config.observability.json_logging = v;
    }
    if let Some(v) = flag("TELEMETRY_DISABLED")? {
        config.observability.telemetry_disabled = v;
    }

    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        fs::write(
            &path,
            r#"
            [listener]
            bind_address = "127.0.0.1:8000"

            [assets]
            roots = ["./dist"]
            base_url = "/app/"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8000");
        assert_eq!(config.assets.base_url, "/app/");
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        fs::write(&path, "[assets]\nroots = []\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("root directory"));
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        fs::write(&path, "[assets\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("SPA_SERVER_ROOTS", "/srv/a, /srv/b,"),
                ("SPA_SERVER_FALLBACK_DISABLED", "true"),
                ("SPA_SERVER_JSON_LOGGING", "off"),
                ("SPA_SERVER_BASE_URL", "/app/"),
            ]),
        )
        .unwrap();

        assert_eq!(config.assets.roots, vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]);
        assert!(config.assets.fallback_disabled);
        assert!(!config.observability.json_logging);
        assert_eq!(config.assets.base_url, "/app/");
        assert!(!config.assets.gzip_disabled);
    }

    #[test]
    fn test_env_override_rejects_bad_flag() {
        let mut config = ServerConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("SPA_SERVER_GZIP_DISABLED", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { ref key, .. } if key == "SPA_SERVER_GZIP_DISABLED"));
    }
}
