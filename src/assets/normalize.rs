//! Request path normalization.
//!
//! Strips the configured base URL and produces the canonical resource path
//! (`/`-prefixed) the rest of the pipeline works with.

use percent_encoding::percent_decode_str;

use crate::assets::spa_fallback::INDEX_PATH;

/// Base URL handling extracted from the configuration.
#[derive(Debug, Clone, Default)]
pub struct BaseUrl {
    prefix: String,
    allow_skip: bool,
}

impl BaseUrl {
    pub fn new(prefix: impl Into<String>, allow_skip: bool) -> Self {
        Self {
            prefix: prefix.into(),
            allow_skip,
        }
    }

    /// Map a request path to a resource path.
    ///
    /// `None` means the path is outside the base URL and must be answered
    /// with 404 without touching the filesystem.
    pub fn normalize(&self, request_path: &str) -> Option<String> {
        let remainder = if self.prefix.is_empty() {
            request_path
        } else if let Some(stripped) = request_path.strip_prefix(self.prefix.as_str()) {
            stripped
        } else if is_bare_base(request_path, &self.prefix) {
            ""
        } else if self.allow_skip {
            request_path
        } else {
            return None;
        };

        let remainder = remainder.trim_start_matches('/');
        if remainder.is_empty() {
            Some(INDEX_PATH.to_string())
        } else {
            Some(format!("/{remainder}"))
        }
    }
}

/// `/app` against base `/app/`.
fn is_bare_base(request_path: &str, prefix: &str) -> bool {
    prefix.strip_suffix('/') == Some(request_path)
}

/// Percent-decode the URI path. Invalid UTF-8 is replaced, not rejected.
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
