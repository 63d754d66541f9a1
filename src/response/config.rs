//! The response descriptor: everything known about a response before it is flushed.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use http::{HeaderMap, StatusCode};
use serde::Serialize;

use crate::errors::{Error, Errors};

/// A readable body stream that may hold a resource needing release.
///
/// `close` is called exactly once by `flush`, after the copy finished or failed.
pub trait BodySource: Read + Send {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Adapts any reader into a [`BodySource`] with nothing to close.
pub(crate) struct Unclosable<R>(pub(crate) R);

impl<R: Read> Read for Unclosable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read + Send> BodySource for Unclosable<R> {}

/// A value awaiting JSON serialization.
pub trait JsonEncode: Send + Sync {
    fn encode(&self, writer: &mut dyn io::Write) -> serde_json::Result<()>;
}

impl<T: Serialize + Send + Sync> JsonEncode for T {
    fn encode(&self, writer: &mut dyn io::Write) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }
}

/// The single body slot. Setting one kind replaces whatever was there.
#[derive(Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    Json(Arc<dyn JsonEncode>),
    Stream(Box<dyn BodySource>),
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Empty => f.write_str("Empty"),
            ResponseBody::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ResponseBody::Json(_) => f.write_str("Json(..)"),
            ResponseBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Mutable, poolable state of one response under composition.
#[derive(Debug)]
pub struct ResponseConfig {
    headers: HeaderMap,
    status: StatusCode,
    body: ResponseBody,
    errors: Errors,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            status: StatusCode::OK,
            body: ResponseBody::Empty,
            errors: Errors::default(),
        }
    }
}

impl ResponseConfig {
    /// Restore defaults: 200, no headers, no body, no errors. Allocations are kept
    /// where the types allow it.
    pub fn reset(&mut self) {
        self.headers.clear();
        self.status = StatusCode::OK;
        self.set_body(ResponseBody::Empty);
        self.errors.clear();
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Replace the body. A displaced stream is closed.
    pub fn set_body(&mut self, body: ResponseBody) {
        if let ResponseBody::Stream(mut displaced) = std::mem::replace(&mut self.body, body) {
            let _ = displaced.close();
        }
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn push_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Split into the parts written during commit.
    pub(crate) fn take_parts(&mut self) -> (&HeaderMap, StatusCode, ResponseBody, &Errors) {
        let body = std::mem::take(&mut self.body);
        (&self.headers, self.status, body, &self.errors)
    }
}
