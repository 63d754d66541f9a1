//! Response option constructors.
//!
//! Each constructor returns a [`ResponseOption`] that performs exactly one
//! mutation when applied. Nothing happens until [`crate::response::flush`]
//! applies it.
//!
//! # Rules
//! - Header options add values; they never replace earlier values
//! - `status_code` overwrites; the last one applied wins
//! - Body options share one slot; the last one applied wins
//! - Error options accumulate, and force the JSON content type

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use http::header::{HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::StatusCode;
use serde::Serialize;

use crate::errors::Error;
use crate::response::config::{BodySource, ResponseBody, ResponseConfig, Unclosable};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

type Apply = dyn Fn(&mut ResponseConfig) + Send + Sync;

/// A composable mutation of a [`ResponseConfig`].
///
/// Options are cheap to clone and may be applied any number of times. The
/// default value is a no-op.
#[derive(Clone, Default)]
pub struct ResponseOption(Option<Arc<Apply>>);

impl ResponseOption {
    /// Wrap a custom mutation.
    pub fn new(apply: impl Fn(&mut ResponseConfig) + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(apply)))
    }

    /// The option that does nothing.
    pub const fn noop() -> Self {
        Self(None)
    }

    pub fn is_noop(&self) -> bool {
        self.0.is_none()
    }

    pub fn apply(&self, config: &mut ResponseConfig) {
        if let Some(apply) = &self.0 {
            apply(config);
        }
    }
}

impl fmt::Debug for ResponseOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            f.write_str("ResponseOption(noop)")
        } else {
            f.write_str("ResponseOption(..)")
        }
    }
}

impl From<Option<ResponseOption>> for ResponseOption {
    fn from(option: Option<ResponseOption>) -> Self {
        option.unwrap_or_default()
    }
}

/// Combine options into one that applies each in the given order, skipping no-ops.
pub fn with(options: impl IntoIterator<Item = ResponseOption>) -> ResponseOption {
    let options: Vec<ResponseOption> = options.into_iter().filter(|o| !o.is_noop()).collect();
    match options.len() {
        0 => ResponseOption::noop(),
        1 => options.into_iter().next().unwrap_or_default(),
        _ => ResponseOption::new(move |config| {
            for option in &options {
                option.apply(config);
            }
        }),
    }
}

/// `with(options)` when `condition` holds, otherwise a no-op. The condition is
/// evaluated now, not when the option is applied.
pub fn when(condition: bool, options: impl IntoIterator<Item = ResponseOption>) -> ResponseOption {
    if condition {
        with(options)
    } else {
        ResponseOption::noop()
    }
}

/// Add a header value. Names or values that are not valid HTTP make this a no-op.
pub fn header(key: impl AsRef<str>, value: impl AsRef<str>) -> ResponseOption {
    let name = HeaderName::from_bytes(key.as_ref().as_bytes());
    let value = HeaderValue::from_str(value.as_ref());
    match (name, value) {
        (Ok(name), Ok(value)) => ResponseOption::new(move |config| {
            config.headers_mut().append(name.clone(), value.clone());
        }),
        _ => ResponseOption::noop(),
    }
}

/// Add a `Content-Type` value.
pub fn content_type(mime: impl AsRef<str>) -> ResponseOption {
    header(CONTENT_TYPE, mime)
}

/// Add the JSON `Content-Type` value.
pub fn json_content_type() -> ResponseOption {
    ResponseOption::new(|config| {
        config
            .headers_mut()
            .append(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    })
}

pub fn status_code(status: StatusCode) -> ResponseOption {
    ResponseOption::new(move |config| config.set_status(status))
}

/// Use `bytes` as the body.
pub fn bytes_body(bytes: impl Into<Vec<u8>>) -> ResponseOption {
    let bytes = bytes.into();
    ResponseOption::new(move |config| config.set_body(ResponseBody::Bytes(bytes.clone())))
}

/// Serialize `value` as the JSON body when flushed.
pub fn json_body<T>(value: T) -> ResponseOption
where
    T: Serialize + Send + Sync + 'static,
{
    let value = Arc::new(value);
    ResponseOption::new(move |config| {
        set_json_content_type(config);
        config.set_body(ResponseBody::Json(value.clone()));
    })
}

/// Append one problem to the error envelope.
pub fn json_error(error: Error) -> ResponseOption {
    ResponseOption::new(move |config| {
        set_json_content_type(config);
        config.push_error(error.clone());
    })
}

/// Set the status and append problems to the error envelope.
pub fn json_errors(status: StatusCode, errors: impl IntoIterator<Item = Error>) -> ResponseOption {
    let errors: Vec<Error> = errors.into_iter().collect();
    ResponseOption::new(move |config| {
        config.set_status(status);
        set_json_content_type(config);
        for error in &errors {
            config.push_error(error.clone());
        }
    })
}

/// Copy `reader` into the response.
pub fn body_from_reader<R>(reader: R) -> ResponseOption
where
    R: Read + Send + 'static,
{
    body_from_source(Unclosable(reader))
}

/// Copy `source` into the response, then close it.
///
/// The stream moves into the first descriptor this option is applied to; later
/// applications of the same option leave the body empty.
pub fn body_from_source<S>(source: S) -> ResponseOption
where
    S: BodySource + 'static,
{
    let slot: Mutex<Option<Box<dyn BodySource>>> = Mutex::new(Some(Box::new(source)));
    ResponseOption::new(move |config| {
        let taken = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        config.set_body(taken.map_or(ResponseBody::Empty, ResponseBody::Stream));
    })
}

/// Deliver `source` as a downloaded attachment named `filename`, with the
/// `Content-Type` derived from the file extension.
pub fn body_with_attachment<S>(filename: &str, source: S) -> ResponseOption
where
    S: BodySource + 'static,
{
    let disposition = HeaderValue::from_str(&format!(r#"attachment; filename="{filename}""#)).ok();
    let media_type = HeaderValue::from_str(&media_type_for(filename)).ok();
    let stream = body_from_source(source);
    ResponseOption::new(move |config| {
        let headers = config.headers_mut();
        if let Some(disposition) = &disposition {
            headers.insert(CONTENT_DISPOSITION, disposition.clone());
        }
        if let Some(media_type) = &media_type {
            headers.insert(CONTENT_TYPE, media_type.clone());
        }
        stream.apply(config);
    })
}

fn set_json_content_type(config: &mut ResponseConfig) {
    config
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
}

/// Media type for a filename's extension; text types carry a UTF-8 charset.
pub(crate) fn media_type_for(filename: &str) -> String {
    let extension = Path::new(filename).extension().and_then(|e| e.to_str()).unwrap_or("");
    let mime = mime_guess::from_ext(extension).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::TEXT && mime.get_param("charset").is_none() {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.to_string()
    }
}
