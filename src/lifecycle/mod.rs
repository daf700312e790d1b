//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → ShutdownSignal::stopped() → HttpServer::run stops accepting → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → same graceful path as trigger()
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::shutdown_signal;
