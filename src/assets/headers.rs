//! Response header policy.
//!
//! # Precedence
//! 1. Rule headers whose pattern matches the resource path (replace)
//! 2. Global headers (only where the name is still unset)
//! 3. Default `Cache-Control` (only if still unset)
//!
//! Rules run in declaration order, so the last matching rule wins a
//! contested header name.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use regex::Regex;

use crate::assets::spa_fallback::INDEX_PATH;
use crate::config::{HeadersConfig, ValidationError};

/// Long-lived caching for fingerprinted assets.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// The entry document may be rendered upstream and must be revalidated.
pub const INDEX_CACHE_CONTROL: &str = "no-cache";

#[derive(Debug, Clone)]
struct HeaderRule {
    pattern: Regex,
    headers: Vec<(HeaderName, HeaderValue)>,
}

/// Compiled header configuration.
#[derive(Debug, Clone, Default)]
pub struct HeaderPolicy {
    rules: Vec<HeaderRule>,
    global: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderPolicy {
    pub fn from_config(config: &HeadersConfig) -> Result<Self, ValidationError> {
        let rules = config
            .rules
            .iter()
            .map(|rule| -> Result<HeaderRule, ValidationError> {
                let pattern = Regex::new(&rule.pattern).map_err(|source| {
                    ValidationError::Pattern {
                        field: "headers.rules",
                        source,
                    }
                })?;
                let headers = rule
                    .headers
                    .iter()
                    .map(|(name, value)| compile_header(name, value))
                    .collect::<Result<_, _>>()?;
                Ok(HeaderRule { pattern, headers })
            })
            .collect::<Result<_, _>>()?;

        let global = config
            .global
            .iter()
            .map(|(name, value)| compile_header(name, value))
            .collect::<Result<_, _>>()?;

        Ok(Self { rules, global })
    }

    /// Apply the policy to a response about to be written for `resource_path`.
    pub fn apply(&self, headers: &mut HeaderMap, resource_path: &str) {
        for rule in self.rules.iter().filter(|r| r.pattern.is_match(resource_path)) {
            for (name, value) in &rule.headers {
                headers.insert(name.clone(), value.clone());
            }
        }

        for (name, value) in &self.global {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        if !headers.contains_key(header::CACHE_CONTROL) {
            let default = if resource_path == INDEX_PATH {
                INDEX_CACHE_CONTROL
            } else {
                IMMUTABLE_CACHE_CONTROL
            };
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(default));
        }
    }
}

fn compile_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ValidationError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ValidationError::HeaderName(name.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_| ValidationError::HeaderValue(name.to_string()))?;
    Ok((header_name, header_value))
}
