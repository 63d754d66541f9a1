//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! framework / tasks / main produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (response and flush-failure counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The response/request core never logs; failures are returned to callers
//! - Request ID (`x-request-id`) is recorded on every request span (see `server`)
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
