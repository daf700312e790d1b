//! Static asset resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Request path ──▶ normalize ──▶ negotiate ──▶ import_fallback ──▶ spa_fallback
//!                  (base URL)    (br/gz/raw)   (.mjs/.js/.cjs)     (index.html)
//!                                    │
//!                                    ▼
//!                                 locator (roots searched in order)
//! ```
//!
//! # Design Decisions
//! - All patterns are compiled once into `AssetResolver`; requests only read it
//! - File handles live for a single lookup; the response layer reopens the
//!   resolved path so range and conditional handling stay in one place
//! - Content type always describes the uncompressed representation

pub mod content_type;
pub mod error;
pub mod headers;
pub mod import_fallback;
pub mod locator;
pub mod negotiate;
pub mod normalize;
pub mod resolver;
pub mod spa_fallback;

pub use error::AssetError;
pub use headers::HeaderPolicy;
pub use import_fallback::{ImportFallbackCache, ImportFallbackRule};
pub use locator::{LocatedFile, Locator};
pub use negotiate::{AcceptedEncodings, Encoding, Negotiator, ResolvedAsset};
pub use normalize::BaseUrl;
pub use resolver::{AssetRequest, AssetResolver, Outcome};
pub use spa_fallback::INDEX_PATH;
