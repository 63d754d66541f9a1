//! Response composition and flushing.
//!
//! # Data Flow
//! ```text
//! handler decides outcome
//!     → options.rs (status_code, header, json_body, json_error, ...)
//!     → with / when (ordered composite)
//!     → flush.rs (pooled descriptor: reset → apply → commit)
//!     → sink.rs (ResponseSink: recorder or transport)
//! ```
//!
//! # Design Decisions
//! - Options are values (`Arc<dyn Fn>`), not a type hierarchy
//! - Composition is pure; all I/O happens in `flush`
//! - Accumulated errors always win the body, so error options can be layered
//!   on top of a success composite without branching
//!
//! ```
//! use http::StatusCode;
//! use replykit::errors::Error;
//! use replykit::response::{self, ResponseRecorder};
//!
//! let mut recorder = ResponseRecorder::new();
//! response::flush(&mut recorder, &[
//!     response::status_code(StatusCode::BAD_REQUEST),
//!     response::json_error(Error::new("invalid-id", "The id was invalid.").with_fields(["id"])),
//! ]).unwrap();
//!
//! assert_eq!(recorder.status(), StatusCode::BAD_REQUEST);
//! ```

pub mod config;
pub mod flush;
pub mod json;
pub mod options;
pub mod sink;

pub use config::{BodySource, JsonEncode, ResponseBody, ResponseConfig};
pub use flush::{commit, flush, FlushError};
pub use json::{JsonResponder, JsonResponse};
pub use options::{
    body_from_reader, body_from_source, body_with_attachment, bytes_body, content_type, header,
    json_body, json_content_type, json_error, json_errors, status_code, when, with, ResponseOption,
    JSON_CONTENT_TYPE,
};
pub use sink::{ResponseRecorder, ResponseSink};
