//! Transport-facing side of a flush.

use std::io::{self, Write};

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, StatusCode};

/// Anything that can receive header mutations, one status write and a body.
pub trait ResponseSink: Write {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Only the first call has an effect.
    fn write_status(&mut self, status: StatusCode);
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        (**self).write_status(status)
    }
}

/// An in-memory sink. Used by tests to capture a flushed response and by the
/// framework to build an axum [`Response`].
#[derive(Debug, Default, Clone)]
pub struct ResponseRecorder {
    headers: HeaderMap,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The written status, or 200 if none was written.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Write for ResponseRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }
}

impl IntoResponse for ResponseRecorder {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_written_once() {
        let mut recorder = ResponseRecorder::new();
        recorder.write_status(StatusCode::CREATED);
        recorder.write_status(StatusCode::BAD_REQUEST);
        assert_eq!(recorder.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_body_write_implies_ok() {
        let mut recorder = ResponseRecorder::new();
        recorder.write_all(b"hello").unwrap();
        recorder.write_status(StatusCode::NOT_FOUND);
        assert_eq!(recorder.status(), StatusCode::OK);
        assert_eq!(recorder.body_string(), "hello");
    }

    #[test]
    fn test_into_response() {
        let mut recorder = ResponseRecorder::new();
        recorder.headers_mut().append("x-a", "1".parse().unwrap());
        recorder.write_status(StatusCode::ACCEPTED);

        let response = recorder.into_response();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-a"], "1");
    }
}
