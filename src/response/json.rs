//! Direct JSON responses, for handlers that do not need option composition.

use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde::Serialize;

use crate::response::options::JSON_CONTENT_TYPE;
use crate::response::sink::ResponseSink;

/// A status paired with JSON content.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse<T> {
    pub status: StatusCode,
    pub content: T,
}

/// Writes JSON content with a status in one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponder {
    pretty: bool,
}

impl JsonResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn respond_response<S, T>(&self, sink: &mut S, response: &JsonResponse<T>) -> serde_json::Result<()>
    where
        S: ResponseSink + ?Sized,
        T: Serialize,
    {
        self.respond(sink, response.status, &response.content)
    }

    /// Set the JSON content type, write `status`, then serialize `content`.
    pub fn respond<S, T>(&self, sink: &mut S, status: StatusCode, content: &T) -> serde_json::Result<()>
    where
        S: ResponseSink + ?Sized,
        T: Serialize + ?Sized,
    {
        sink.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        sink.write_status(status);
        if self.pretty {
            serde_json::to_writer_pretty(sink, content)
        } else {
            serde_json::to_writer(sink, content)
        }
    }
}
