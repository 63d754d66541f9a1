//! Commit a composed response to its sink.
//!
//! # Sequence
//! ```text
//! checkout descriptor from pool → reset
//!     → apply options in argument order (no I/O)
//!     → append headers to sink
//!     → write status once
//!     → write one body: the error envelope if any errors, else the body slot
//!     → close stream (if any), exactly once
//!     → descriptor returns to pool
//! ```
//!
//! Nothing is undone after a failure: status and headers are already on the
//! wire by the time the body is written.

use std::io;
use std::sync::LazyLock;

use crate::pool::Pool;
use crate::response::config::{BodySource, ResponseBody, ResponseConfig};
use crate::response::options::ResponseOption;
use crate::response::sink::ResponseSink;

static DESCRIPTORS: LazyLock<Pool<ResponseConfig>> = LazyLock::new(|| Pool::new(ResponseConfig::default));

/// Failure while writing the response body.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    #[error("encoding JSON body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("writing body: {0}")]
    Write(#[source] io::Error),

    #[error("copying body stream: {0}")]
    Copy(#[source] io::Error),

    #[error("closing body stream: {0}")]
    Close(#[source] io::Error),

    #[error("copying body stream: {copy}; closing body stream: {close}")]
    CopyAndClose {
        #[source]
        copy: io::Error,
        close: io::Error,
    },
}

impl FlushError {
    /// The stream copy failure, if one happened.
    pub fn copy_error(&self) -> Option<&io::Error> {
        match self {
            FlushError::Copy(err) | FlushError::CopyAndClose { copy: err, .. } => Some(err),
            _ => None,
        }
    }

    /// The stream close failure, if one happened.
    pub fn close_error(&self) -> Option<&io::Error> {
        match self {
            FlushError::Close(err) | FlushError::CopyAndClose { close: err, .. } => Some(err),
            _ => None,
        }
    }
}

/// Apply `options` in order to a freshly reset descriptor and write the result to `sink`.
pub fn flush<S>(sink: &mut S, options: &[ResponseOption]) -> Result<(), FlushError>
where
    S: ResponseSink + ?Sized,
{
    let mut config = DESCRIPTORS.checkout();
    config.reset();
    for option in options {
        option.apply(&mut config);
    }
    let result = commit(sink, &mut config);
    config.reset();
    result
}

/// Write an already composed descriptor. Headers, then status, then body.
pub fn commit<S>(sink: &mut S, config: &mut ResponseConfig) -> Result<(), FlushError>
where
    S: ResponseSink + ?Sized,
{
    let (headers, status, body, errors) = config.take_parts();

    let out = sink.headers_mut();
    for (name, value) in headers {
        out.append(name.clone(), value.clone());
    }
    sink.write_status(status);

    if !errors.is_empty() {
        let written = write_json(&mut *sink, errors);
        let closed = match body {
            ResponseBody::Stream(source) => CloseGuard(Some(source)).close(),
            _ => Ok(()),
        };
        return written.and(closed.map_err(FlushError::Close));
    }
    match body {
        ResponseBody::Empty => Ok(()),
        ResponseBody::Json(value) => value.encode(&mut &mut *sink).map_err(encode_error),
        ResponseBody::Stream(source) => copy_stream(sink, source),
        ResponseBody::Bytes(bytes) => sink.write_all(&bytes).map_err(FlushError::Write),
    }
}

fn write_json<S, T>(sink: &mut S, value: &T) -> Result<(), FlushError>
where
    S: ResponseSink + ?Sized,
    T: serde::Serialize + ?Sized,
{
    serde_json::to_writer(sink, value).map_err(encode_error)
}

// serde_json wraps sink failures in its own error; report those as write failures.
fn encode_error(err: serde_json::Error) -> FlushError {
    if err.is_io() {
        FlushError::Write(io::Error::from(err))
    } else {
        FlushError::Encode(err)
    }
}

fn copy_stream<S>(sink: &mut S, source: Box<dyn BodySource>) -> Result<(), FlushError>
where
    S: ResponseSink + ?Sized,
{
    let mut guard = CloseGuard(Some(source));
    let copied = match guard.0.as_mut() {
        Some(source) => io::copy(source, sink).map(drop),
        None => Ok(()),
    };
    let closed = guard.close();
    match (copied, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(copy), Ok(())) => Err(FlushError::Copy(copy)),
        (Ok(()), Err(close)) => Err(FlushError::Close(close)),
        (Err(copy), Err(close)) => Err(FlushError::CopyAndClose { copy, close }),
    }
}

/// Closes the stream on every path, including unwinding out of the copy.
struct CloseGuard(Option<Box<dyn BodySource>>);

impl CloseGuard {
    fn close(&mut self) -> io::Result<()> {
        match self.0.take() {
            Some(mut source) => source.close(),
            None => Ok(()),
        }
    }
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::response::options::*;
    use crate::response::sink::ResponseRecorder;
    use http::header::CONTENT_TYPE;
    use http::StatusCode;
    use std::io::Read;

    #[test]
    fn test_empty_flush_is_ok() {
        let mut recorder = ResponseRecorder::new();
        flush(&mut recorder, &[]).unwrap();
        assert_eq!(recorder.status(), StatusCode::OK);
        assert!(recorder.headers().is_empty());
        assert!(recorder.body().is_empty());
    }

    #[test]
    fn test_errors_win_over_json_body() {
        let mut recorder = ResponseRecorder::new();
        flush(
            &mut recorder,
            &[json_body(vec!["happy"]), json_error(Error::new("sad", "sad path"))],
        )
        .unwrap();
        assert_eq!(recorder.body_string(), r#"{"errors":[{"name":"sad","message":"sad path"}]}"#);
    }

    #[test]
    fn test_errors_win_over_stream_and_close_still_happens() {
        let source = Tracked::new(b"unused", None, None);
        let closed = source.closed.clone();
        let mut recorder = ResponseRecorder::new();

        flush(&mut recorder, &[body_from_source(source), json_error(Error::new("e", "m"))]).unwrap();

        assert_eq!(recorder.body_string(), r#"{"errors":[{"name":"e","message":"m"}]}"#);
        assert_eq!(closed.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_headers_are_appended_to_existing_sink_headers() {
        let mut recorder = ResponseRecorder::new();
        recorder.headers_mut().append("x-existing", "1".parse().unwrap());

        flush(&mut recorder, &[header("x-existing", "2"), json_content_type()]).unwrap();

        let values: Vec<_> = recorder.headers().get_all("x-existing").iter().collect();
        assert_eq!(values, ["1", "2"]);
        assert_eq!(recorder.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_encode_failure_propagates() {
        struct Unserializable;
        impl serde::Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot serialize"))
            }
        }

        let mut recorder = ResponseRecorder::new();
        let err = flush(&mut recorder, &[json_body(Unserializable)]).unwrap_err();
        assert!(matches!(err, FlushError::Encode(_)));
    }

    #[test]
    fn test_close_failure_alone_is_reported() {
        let source = Tracked::new(b"fine", None, Some("close failed"));
        let mut recorder = ResponseRecorder::new();

        let err = flush(&mut recorder, &[body_from_source(source)]).unwrap_err();

        assert!(err.copy_error().is_none());
        assert_eq!(err.close_error().unwrap().to_string(), "close failed");
        assert_eq!(recorder.body_string(), "fine");
    }

    // Source that yields `data`, then optionally fails the next read.
    struct Tracked {
        data: &'static [u8],
        read_err: Option<&'static str>,
        close_err: Option<&'static str>,
        closed: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl Tracked {
        fn new(data: &'static [u8], read_err: Option<&'static str>, close_err: Option<&'static str>) -> Self {
            Self { data, read_err, close_err, closed: Default::default() }
        }
    }

    impl Read for Tracked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return match self.read_err {
                    Some(msg) => Err(io::Error::other(msg)),
                    None => Ok(0),
                };
            }
            self.data.read(buf)
        }
    }

    impl BodySource for Tracked {
        fn close(&mut self) -> io::Result<()> {
            self.closed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            match self.close_err {
                Some(msg) => Err(io::Error::other(msg)),
                None => Ok(()),
            }
        }
    }
}
