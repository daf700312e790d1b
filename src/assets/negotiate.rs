//! Precompressed variant negotiation.
//!
//! # Responsibilities
//! - Pick a `.br` / `.gz` sibling the client accepts, brotli first
//! - Fall back to the uncompressed file
//! - Resolve the content type from the uncompressed path
//!
//! # Design Decisions
//! - Variants are produced ahead of time; nothing is compressed on the fly
//! - A missing sibling is a miss, an I/O error on it aborts the lookup
//! - Content type never comes from the `.br`/`.gz` name

use std::fmt;
use std::path::PathBuf;

use axum::http::{header, HeaderMap};
use mime_guess::mime::{self, Mime};
use tracing::Instrument;

use crate::assets::content_type;
use crate::assets::error::AssetError;
use crate::assets::locator::{LocatedFile, Locator};

/// A precompressed encoding the server knows how to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Brotli,
    Gzip,
}

impl Encoding {
    /// Token used in `Accept-Encoding` and `Content-Encoding`.
    pub fn token(self) -> &'static str {
        match self {
            Encoding::Brotli => "br",
            Encoding::Gzip => "gzip",
        }
    }

    /// Suffix of the sibling file holding this encoding.
    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Brotli => "br",
            Encoding::Gzip => "gz",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Encodings advertised by the client, as raw comma-separated tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedEncodings {
    tokens: Vec<String>,
}

impl AcceptedEncodings {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let tokens = headers
            .get_all(header::ACCEPT_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { tokens }
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Prefix match, so `br;q=0.8` accepts brotli.
    pub fn accepts(&self, encoding: Encoding) -> bool {
        self.tokens.iter().any(|t| t.starts_with(encoding.token()))
    }
}

/// Everything the responder needs to stream a resolved file.
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    /// Logical path the asset was requested under (uncompressed name).
    pub resource_path: String,
    /// File on disk that will be streamed.
    pub file_path: PathBuf,
    pub content_type: Mime,
    pub encoding: Option<Encoding>,
}

/// Chooses between precompressed siblings and the raw file.
#[derive(Debug, Clone)]
pub struct Negotiator {
    locator: Locator,
    encodings: Vec<Encoding>,
}

impl Negotiator {
    /// `brotli` and `gzip` say whether each encoding is enabled.
    pub fn new(locator: Locator, brotli: bool, gzip: bool) -> Self {
        let mut encodings = Vec::with_capacity(2);
        if brotli {
            encodings.push(Encoding::Brotli);
        }
        if gzip {
            encodings.push(Encoding::Gzip);
        }
        Self { locator, encodings }
    }

    /// Resolve `resource_path`, preferring an accepted precompressed sibling.
    pub async fn negotiate(
        &self,
        resource_path: &str,
        accepted: &AcceptedEncodings,
    ) -> Result<Option<ResolvedAsset>, AssetError> {
        for &encoding in &self.encodings {
            if !accepted.accepts(encoding) {
                continue;
            }

            let span = tracing::debug_span!(
                "lookup_encoded_asset",
                path = resource_path,
                encoding = encoding.token()
            );
            let variant = format!("{resource_path}.{}", encoding.extension());
            let found = self.locator.find(&variant).instrument(span).await?;

            if let Some(located) = found {
                let content_type = self.resolve_twin_content_type(resource_path).await?;
                return Ok(Some(asset(resource_path, located, content_type, Some(encoding))));
            }
        }

        match self.locator.find(resource_path).await? {
            Some(mut located) => {
                let content_type = match content_type::by_extension(resource_path) {
                    Some(known) => known,
                    None => content_type::sniff_file(&mut located).await?,
                };
                Ok(Some(asset(resource_path, located, content_type, None)))
            }
            None => Ok(None),
        }
    }

    /// Content type of the uncompressed twin of a precompressed variant.
    async fn resolve_twin_content_type(&self, resource_path: &str) -> Result<Mime, AssetError> {
        if let Some(known) = content_type::by_extension(resource_path) {
            return Ok(known);
        }
        match self.locator.find(resource_path).await? {
            Some(mut twin) => content_type::sniff_file(&mut twin).await,
            None => Ok(mime::APPLICATION_OCTET_STREAM),
        }
    }
}

fn asset(
    resource_path: &str,
    located: LocatedFile,
    content_type: Mime,
    encoding: Option<Encoding>,
) -> ResolvedAsset {
    ResolvedAsset {
        resource_path: resource_path.to_string(),
        file_path: located.path,
        content_type,
        encoding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("app.js"), "plain").unwrap();
        fs::write(root.path().join("app.js.br"), "brotli bytes").unwrap();
        fs::write(root.path().join("app.js.gz"), "gzip bytes").unwrap();
        fs::write(root.path().join("README"), "just text").unwrap();
        fs::write(root.path().join("README.gz"), "gz readme").unwrap();
        fs::write(root.path().join("blob.gz"), "orphan").unwrap();
        root
    }

    fn negotiator(root: &TempDir, brotli: bool, gzip: bool) -> Negotiator {
        Negotiator::new(Locator::new(vec![root.path().into()]), brotli, gzip)
    }

    #[test]
    fn test_accept_encoding_prefix_match() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("deflate, br;q=0.8"));
        let accepted = AcceptedEncodings::from_headers(&headers);
        assert!(accepted.accepts(Encoding::Brotli));
        assert!(!accepted.accepts(Encoding::Gzip));

        assert!(!AcceptedEncodings::default().accepts(Encoding::Brotli));
    }

    #[tokio::test]
    async fn test_brotli_preferred_over_gzip() {
        let root = site();
        let accepted = AcceptedEncodings::from_tokens(["gzip", "br"]);
        let asset = negotiator(&root, true, true)
            .negotiate("/app.js", &accepted)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(asset.encoding, Some(Encoding::Brotli));
        assert_eq!(asset.file_path, root.path().join("app.js.br"));
        assert_eq!(asset.content_type, mime::APPLICATION_JAVASCRIPT);
        assert_eq!(asset.resource_path, "/app.js");
    }

    #[tokio::test]
    async fn test_disabled_encoding_is_skipped() {
        let root = site();
        let accepted = AcceptedEncodings::from_tokens(["br", "gzip"]);
        let asset = negotiator(&root, false, true)
            .negotiate("/app.js", &accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(asset.encoding, Some(Encoding::Gzip));

        let asset = negotiator(&root, false, false)
            .negotiate("/app.js", &accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(asset.encoding, None);
        assert_eq!(asset.file_path, root.path().join("app.js"));
    }

    #[tokio::test]
    async fn test_missing_variant_falls_through_to_raw_file() {
        let root = site();
        let accepted = AcceptedEncodings::from_tokens(["br"]);
        let asset = negotiator(&root, true, true)
            .negotiate("/README", &accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(asset.encoding, None);
        assert_eq!(asset.content_type, mime::TEXT_PLAIN_UTF_8);
    }

    #[tokio::test]
    async fn test_unmapped_extension_sniffs_uncompressed_twin() {
        let root = site();
        let accepted = AcceptedEncodings::from_tokens(["gzip"]);
        let asset = negotiator(&root, true, true)
            .negotiate("/README", &accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(asset.encoding, Some(Encoding::Gzip));
        assert_eq!(asset.content_type, mime::TEXT_PLAIN_UTF_8);

        let asset = negotiator(&root, true, true)
            .negotiate("/blob", &accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(asset.content_type, mime::APPLICATION_OCTET_STREAM);
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let root = site();
        let accepted = AcceptedEncodings::from_tokens(["br", "gzip"]);
        let found = negotiator(&root, true, true)
            .negotiate("/missing.js", &accepted)
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
