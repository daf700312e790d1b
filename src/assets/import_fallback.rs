//! Extensionless module import resolution.
//!
//! Bundlers such as Vite emit `import "./components/button"` without a suffix.
//! A miss on such a path is retried with `.mjs`, `.js` and `.cjs`, and the
//! suffix that worked is remembered for the lifetime of the server.
//!
//! # Design Decisions
//! - The cache is a handle owned by the server and injected, never a global
//! - No invalidation and no negative entries: a cached real path stays
//!   authoritative even if the file disappears later
//! - Two requests racing on the same path may both probe and both store;
//!   the stored value is the same either way

use std::sync::Arc;

use dashmap::DashMap;
use regex::Regex;
use tracing::Instrument;

use crate::assets::error::AssetError;
use crate::assets::negotiate::{AcceptedEncodings, Negotiator, ResolvedAsset};

/// Suffixes probed, in order.
pub const SCRIPT_SUFFIXES: [&str; 3] = [".mjs", ".js", ".cjs"];

/// Which extensionless paths may be resolved.
#[derive(Debug, Clone)]
pub enum ImportFallbackRule {
    Disabled,
    Unrestricted,
    Restricted(Regex),
}

impl ImportFallbackRule {
    /// Empty means unrestricted, a `disable` prefix turns the feature off,
    /// anything else is a regular expression.
    pub fn parse(pattern: &str) -> Result<Self, regex::Error> {
        if pattern.is_empty() {
            Ok(Self::Unrestricted)
        } else if pattern.starts_with("disable") {
            Ok(Self::Disabled)
        } else {
            Regex::new(pattern).map(Self::Restricted)
        }
    }
}

/// Concurrent map from unresolved path to the real path that served it.
#[derive(Debug, Clone, Default)]
pub struct ImportFallbackCache {
    inner: Arc<DashMap<String, String>>,
}

impl ImportFallbackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource_path: &str) -> Option<String> {
        self.inner.get(resource_path).map(|r| r.value().clone())
    }

    pub fn insert(&self, resource_path: String, real_path: String) {
        self.inner.insert(resource_path, real_path);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Resolves extensionless imports through the negotiator.
#[derive(Debug, Clone)]
pub struct ImportFallback {
    rule: ImportFallbackRule,
    cache: ImportFallbackCache,
}

impl ImportFallback {
    pub fn new(rule: ImportFallbackRule, cache: ImportFallbackCache) -> Self {
        Self { rule, cache }
    }

    pub fn cache(&self) -> &ImportFallbackCache {
        &self.cache
    }

    pub async fn resolve(
        &self,
        resource_path: &str,
        negotiator: &Negotiator,
        accepted: &AcceptedEncodings,
    ) -> Result<Option<ResolvedAsset>, AssetError> {
        if matches!(self.rule, ImportFallbackRule::Disabled)
            || SCRIPT_SUFFIXES.iter().any(|s| resource_path.ends_with(s))
        {
            return Ok(None);
        }

        let span = tracing::debug_span!("import_fallback", path = resource_path);
        async move {
            if let Some(real_path) = self.cache.get(resource_path) {
                tracing::debug!(real_path = %real_path, "Import fallback cache hit");
                return negotiator.negotiate(&real_path, accepted).await;
            }

            if let ImportFallbackRule::Restricted(pattern) = &self.rule {
                if !pattern.is_match(resource_path) {
                    return Ok(None);
                }
            }

            for suffix in SCRIPT_SUFFIXES {
                let real_path = format!("{resource_path}{suffix}");
                if let Some(asset) = negotiator.negotiate(&real_path, accepted).await? {
                    tracing::debug!(real_path = %real_path, "Import fallback resolved");
                    self.cache.insert(resource_path.to_string(), real_path);
                    return Ok(Some(asset));
                }
            }

            Ok(None)
        }
        .instrument(span)
        .await
    }
}
