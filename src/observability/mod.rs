//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! serve_handler
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (one Signal per request → TelemetrySink)
//!
//! Consumers:
//!     → stdout (JSON or human format)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - The handler depends on the `TelemetrySink` trait, never on a backend
//! - Counters are labelled by resource path
//! - Disabled telemetry swaps in `NoopSink`; nothing else changes

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{init_metrics, MetricsSink, NoopSink, Signal, TelemetrySink};
