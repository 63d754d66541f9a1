//! Composable HTTP responses.
//!
//! # Architecture Overview
//!
//! ```text
//!     Request ──▶ framework (buffer body) ──▶ Shell::serve ──▶ ResponseOption
//!                                                                  │
//!                     ┌────────────────────────────────────────────┘
//!                     ▼
//!              response::flush
//!         (pooled ResponseConfig: reset → apply → commit → reset)
//!                     │
//!                     ▼
//!              ResponseSink ──▶ axum Response
//! ```
//!
//! Handlers describe a response as a composite of options (status, headers,
//! body, errors) and never write to the transport themselves. The flush step
//! owns all I/O and resolves conflicts with fixed rules: headers accumulate,
//! the last status wins, the last body wins, and any accumulated error
//! replaces the body with a JSON error envelope.
//!
//! `request` holds the matching pieces on the way in: a JSON body reader that
//! answers with ready-made error options, lenient header/path/query readers,
//! and a builder for test requests.

// Core
pub mod errors;
pub mod pool;
pub mod request;
pub mod response;

// Integration
pub mod framework;
pub mod server;

// Cross-cutting concerns
pub mod config;
pub mod observability;

// Demonstration service
pub mod tasks;

pub use config::schema::ServerConfig;
pub use errors::{Error, Errors};
pub use response::{flush, ResponseOption};
pub use server::HttpServer;
