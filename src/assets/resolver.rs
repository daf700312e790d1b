//! Request-to-asset resolution.
//!
//! ```text
//! NORMALIZE ──mismatch──▶ Rejected (404)
//!     │
//!     ▼
//! RESOLVE ──found──▶ Served
//!     │ miss
//!     ▼
//! IMPORT_FALLBACK ──found──▶ Served
//!     │ miss
//!     ▼
//! SPA_FALLBACK ──found──▶ FallbackServed
//!     │ miss / skipped
//!     ▼
//! NotFound (404)
//! ```
//!
//! Any `AssetError` ends resolution immediately; the caller answers 500.

use axum::http::HeaderMap;
use regex::Regex;
use tracing::Instrument;

use crate::assets::error::AssetError;
use crate::assets::headers::HeaderPolicy;
use crate::assets::import_fallback::{ImportFallback, ImportFallbackCache, ImportFallbackRule};
use crate::assets::locator::Locator;
use crate::assets::negotiate::{AcceptedEncodings, Negotiator, ResolvedAsset};
use crate::assets::normalize::{decode_path, BaseUrl};
use crate::assets::spa_fallback::{accept_values, SpaFallback, INDEX_PATH};
use crate::config::{ServerConfig, ValidationError};

/// The parts of a request the pipeline looks at.
#[derive(Debug, Clone, Default)]
pub struct AssetRequest {
    /// Percent-decoded URL path.
    pub path: String,
    /// `Accept` media ranges.
    pub accept: Vec<String>,
    pub encodings: AcceptedEncodings,
}

impl AssetRequest {
    pub fn new(raw_path: &str, headers: &HeaderMap) -> Self {
        Self {
            path: decode_path(raw_path),
            accept: accept_values(headers),
            encodings: AcceptedEncodings::from_headers(headers),
        }
    }
}

/// Terminal state of a successful resolution.
#[derive(Debug)]
pub enum Outcome {
    Served(ResolvedAsset),
    /// The entry document, substituted for an unresolved path.
    FallbackServed(ResolvedAsset),
    NotFound,
    /// The path lies outside the base URL.
    Rejected,
}

/// Immutable resolution pipeline shared by every request.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    base_url: BaseUrl,
    negotiator: Negotiator,
    import_fallback: ImportFallback,
    spa_fallback: SpaFallback,
    header_policy: HeaderPolicy,
}

impl AssetResolver {
    /// Compile the configuration snapshot. `cache` is owned by the caller so
    /// it can be shared or inspected.
    pub fn from_config(
        config: &ServerConfig,
        cache: ImportFallbackCache,
    ) -> Result<Self, ValidationError> {
        let assets = &config.assets;
        if assets.roots.is_empty() {
            return Err(ValidationError::NoRoots);
        }

        let not_found = assets
            .not_found_regexps
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ValidationError::Pattern {
                    field: "assets.not_found_regexps",
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rule = ImportFallbackRule::parse(&assets.import_fallback_regexp).map_err(|source| {
            ValidationError::Pattern {
                field: "assets.import_fallback_regexp",
                source,
            }
        })?;

        Ok(Self {
            base_url: BaseUrl::new(assets.base_url.clone(), assets.allow_skip_base_url),
            negotiator: Negotiator::new(
                Locator::new(assets.roots.clone()),
                !assets.brotli_disabled,
                !assets.gzip_disabled,
            ),
            import_fallback: ImportFallback::new(rule, cache),
            spa_fallback: SpaFallback::new(assets.fallback_disabled, not_found),
            header_policy: HeaderPolicy::from_config(&config.headers)?,
        })
    }

    pub fn header_policy(&self) -> &HeaderPolicy {
        &self.header_policy
    }

    pub fn import_cache(&self) -> &ImportFallbackCache {
        self.import_fallback.cache()
    }

    /// Run the pipeline for one request.
    pub async fn resolve(&self, request: &AssetRequest) -> Result<Outcome, AssetError> {
        let Some(resource_path) = self.base_url.normalize(&request.path) else {
            tracing::debug!(path = %request.path, "Base URL mismatch");
            return Ok(Outcome::Rejected);
        };

        if let Some(asset) = self
            .negotiator
            .negotiate(&resource_path, &request.encodings)
            .await?
        {
            return Ok(Outcome::Served(asset));
        }

        if let Some(asset) = self
            .import_fallback
            .resolve(&resource_path, &self.negotiator, &request.encodings)
            .await?
        {
            return Ok(Outcome::Served(asset));
        }

        if !self
            .spa_fallback
            .should_fall_back(&resource_path, &request.accept)
        {
            return Ok(Outcome::NotFound);
        }

        let span = tracing::debug_span!("spa_fallback", path = %resource_path);
        match self
            .negotiator
            .negotiate(INDEX_PATH, &request.encodings)
            .instrument(span)
            .await?
        {
            Some(asset) => Ok(Outcome::FallbackServed(asset)),
            None => Ok(Outcome::NotFound),
        }
    }
}
