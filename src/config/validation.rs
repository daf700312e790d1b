//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile-check every regular expression before the server starts
//! - Validate header names and values
//! - Validate addresses and the base URL shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use regex::Regex;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("at least one root directory is required")]
    NoRoots,

    #[error("base_url {0:?} must start and end with '/'")]
    BaseUrl(String),

    #[error("invalid address {field} = {value:?}")]
    Address { field: &'static str, value: String },

    #[error("invalid regular expression in {field}: {source}")]
    Pattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("invalid header name {0:?}")]
    HeaderName(String),

    #[error("invalid value for header {0:?}")]
    HeaderValue(String),
}

/// Validate the whole configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.assets.roots.is_empty() {
        errors.push(ValidationError::NoRoots);
    }

    let base_url = &config.assets.base_url;
    if !base_url.is_empty() && !(base_url.starts_with('/') && base_url.ends_with('/')) {
        errors.push(ValidationError::BaseUrl(base_url.clone()));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if !config.observability.telemetry_disabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    for pattern in &config.assets.not_found_regexps {
        check_pattern("assets.not_found_regexps", pattern, &mut errors);
    }

    let import = &config.assets.import_fallback_regexp;
    if !import.is_empty() && !import.starts_with("disable") {
        check_pattern("assets.import_fallback_regexp", import, &mut errors);
    }

    for rule in &config.headers.rules {
        check_pattern("headers.rules", &rule.pattern, &mut errors);
        for (name, value) in &rule.headers {
            check_header(name, value, &mut errors);
        }
    }

    for (name, value) in &config.headers.global {
        check_header(name, value, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_pattern(field: &'static str, pattern: &str, errors: &mut Vec<ValidationError>) {
    if let Err(source) = Regex::new(pattern) {
        errors.push(ValidationError::Pattern { field, source });
    }
}

fn check_header(name: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if HeaderName::from_bytes(name.as_bytes()).is_err() {
        errors.push(ValidationError::HeaderName(name.to_string()));
    }
    if HeaderValue::from_str(value).is_err() {
        errors.push(ValidationError::HeaderValue(name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::HeaderRuleConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.assets.roots.clear();
        config.assets.base_url = "app".into();
        config.assets.not_found_regexps = vec!["(".into()];
        config.headers.global.insert("Bad Header".into(), "v".into());
        config.headers.rules.push(HeaderRuleConfig {
            pattern: "[".into(),
            headers: [("X-Ok".to_string(), "line\nbreak".to_string())].into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(matches!(errors[0], ValidationError::NoRoots));
        assert!(matches!(errors[1], ValidationError::BaseUrl(_)));
    }

    #[test]
    fn test_disabled_import_fallback_is_not_compiled() {
        let mut config = ServerConfig::default();
        config.assets.import_fallback_regexp = "disabled(".into();
        assert!(validate_config(&config).is_ok());

        config.assets.import_fallback_regexp = "^/src/(".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_metrics_address_ignored_when_telemetry_disabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_err());

        config.observability.telemetry_disabled = true;
        assert!(validate_config(&config).is_ok());
    }
}
