//! Entry document fallback for client-side routes.
//!
//! A browser navigating to `/settings/profile` expects the application shell,
//! while a script or API client asking for a missing file expects a 404.

use axum::http::{header, HeaderMap};
use regex::Regex;

/// Resource path of the application entry document.
pub const INDEX_PATH: &str = "/index.html";

/// Decides whether an unresolved path gets the entry document.
#[derive(Debug, Clone)]
pub struct SpaFallback {
    disabled: bool,
    not_found: Vec<Regex>,
}

impl SpaFallback {
    pub fn new(disabled: bool, not_found: Vec<Regex>) -> Self {
        Self { disabled, not_found }
    }

    /// `accept` holds the request's `Accept` values, already split on commas.
    pub fn should_fall_back(&self, resource_path: &str, accept: &[String]) -> bool {
        if self.disabled {
            return false;
        }
        if !accepts_html(accept) {
            return false;
        }
        !self.not_found.iter().any(|re| re.is_match(resource_path))
    }
}

/// Split every `Accept` header into trimmed media ranges.
pub fn accept_values(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// No `Accept` header counts as accepting anything.
fn accepts_html(accept: &[String]) -> bool {
    accept.is_empty() || accept.iter().any(|v| v.starts_with("text/html"))
}
