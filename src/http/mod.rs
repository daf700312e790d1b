//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, serve_handler)
//!     → request.rs (request ID)
//!     → assets::AssetResolver (decides what to serve)
//!     → response.rs (ServeFile + header policy, or fixed error body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
