//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the asset server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, timeouts).
    pub listener: ListenerConfig,

    /// Asset lookup and fallback behaviour.
    pub assets: AssetsConfig,

    /// Response headers injected into every served asset.
    pub headers: HeadersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:7105").
    pub bind_address: String,

    /// Request timeout (total time to produce a response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7105".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Asset lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Root directories searched in order; the first one containing a file wins.
    pub roots: Vec<PathBuf>,

    /// Prefix every request path must carry (e.g., "/app/"). Empty disables stripping.
    pub base_url: String,

    /// Serve paths outside `base_url` unmodified instead of answering 404.
    pub allow_skip_base_url: bool,

    /// Never substitute the entry document for unresolved paths.
    pub fallback_disabled: bool,

    /// Ignore `.gz` siblings.
    pub gzip_disabled: bool,

    /// Ignore `.br` siblings.
    pub brotli_disabled: bool,

    /// Paths matching any of these never fall back to the entry document.
    pub not_found_regexps: Vec<String>,

    /// Restricts extensionless import resolution.
    /// Empty = every extensionless path, `disable...` = off, anything else is a regex.
    pub import_fallback_regexp: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from("./public")],
            base_url: String::new(),
            allow_skip_base_url: false,
            fallback_disabled: false,
            gzip_disabled: false,
            brotli_disabled: false,
            not_found_regexps: vec![r"(\.js|\.json|\.mjs|\.png|\.jpe?g|\.woff2)".to_string()],
            import_fallback_regexp: String::new(),
        }
    }
}

/// Header injection configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HeadersConfig {
    /// Headers added to every response unless already set.
    pub global: BTreeMap<String, String>,

    /// Per-path rules, applied in declaration order.
    pub rules: Vec<HeaderRuleConfig>,
}

/// Headers applied when the resolved resource path matches `pattern`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeaderRuleConfig {
    /// Regular expression matched against the resource path.
    pub pattern: String,

    /// Header name to value.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logging: bool,

    /// Disable counters and the metrics endpoint.
    pub telemetry_disabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: true,
            telemetry_disabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
