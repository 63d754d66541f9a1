//! JSON request bodies.

use std::io::{self, Read};

use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{INVALID_REQUEST_JSON_BODY, UNSUPPORTED_REQUEST_CONTENT_TYPE};
use crate::response::{json_errors, ResponseOption};

/// What to do when a JSON body arrives without a JSON `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentTypePolicy {
    /// Decode regardless of the header.
    Ignore,
    /// Reject with 415 unless the header names a JSON media type.
    #[default]
    RequireJson,
}

/// Failure to read a JSON body from a stream.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("reading body: {0}")]
    Read(#[from] io::Error),
    #[error("decoding JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode JSON from `reader`. Empty (or whitespace-only) input and a literal
/// `null` are not errors and yield `None`.
pub fn deserialize_json<T, R>(mut reader: R) -> Result<Option<T>, DecodeError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    decode_slice(&raw).map_err(DecodeError::Json)
}

fn decode_slice<T: DeserializeOwned>(raw: &[u8]) -> serde_json::Result<Option<T>> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<T>>(raw)
}

/// Whether a `Content-Type` value names JSON (`application/json` or `+json`).
pub fn is_json_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Reads JSON request bodies under a [`ContentTypePolicy`], turning failures
/// into ready-made error responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRequest {
    policy: ContentTypePolicy,
}

impl JsonRequest {
    pub fn new(policy: ContentTypePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ContentTypePolicy {
        self.policy
    }

    /// `Ok(None)` for an empty or `null` body; `Err` carries a 415 or 400 error
    /// response.
    pub fn read_body<T>(&self, headers: &HeaderMap, body: &[u8]) -> Result<Option<T>, ResponseOption>
    where
        T: DeserializeOwned,
    {
        if self.policy == ContentTypePolicy::RequireJson && !has_json_content_type(headers) {
            return Err(json_errors(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                [UNSUPPORTED_REQUEST_CONTENT_TYPE],
            ));
        }
        decode_slice(body)
            .map_err(|_| json_errors(StatusCode::BAD_REQUEST, [INVALID_REQUEST_JSON_BODY]))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get_all(CONTENT_TYPE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(is_json_content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::builder::{body, header, json_body, new_test_request};
    use crate::response::{flush, ResponseRecorder};
    use http::Method;
    use std::collections::HashMap;

    fn assert_response_eq(expected: ResponseOption, actual: ResponseOption) {
        let mut want = ResponseRecorder::new();
        let mut got = ResponseRecorder::new();
        flush(&mut want, &[expected]).unwrap();
        flush(&mut got, &[actual]).unwrap();

        assert_eq!(got.status(), want.status());
        assert_eq!(got.headers(), want.headers());
        assert_eq!(got.body(), want.body());
    }

    async fn parts(request: http::Request<axum::body::Body>) -> (HeaderMap, Vec<u8>) {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        (parts.headers, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let (headers, raw) = parts(new_test_request(Method::PUT, "/", [])).await;

        let err = JsonRequest::default()
            .read_body::<HashMap<String, i32>>(&headers, &raw)
            .unwrap_err();

        assert_response_eq(
            json_errors(StatusCode::UNSUPPORTED_MEDIA_TYPE, [UNSUPPORTED_REQUEST_CONTENT_TYPE]),
            err,
        );
    }

    #[tokio::test]
    async fn test_ignore_policy_accepts_missing_content_type() {
        let request = new_test_request(Method::PUT, "/", [body(&br#"{"a":1}"#[..])]);
        let (headers, raw) = parts(request).await;

        let decoded: Option<HashMap<String, i32>> =
            JsonRequest::new(ContentTypePolicy::Ignore).read_body(&headers, &raw).unwrap();

        assert_eq!(decoded.unwrap()["a"], 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let request = new_test_request(
            Method::PUT,
            "/",
            [header("Content-Type", "application/json"), body(&b"{invalid"[..])],
        );
        let (headers, raw) = parts(request).await;

        let err = JsonRequest::default()
            .read_body::<HashMap<String, i32>>(&headers, &raw)
            .unwrap_err();

        assert_response_eq(json_errors(StatusCode::BAD_REQUEST, [INVALID_REQUEST_JSON_BODY]), err);
    }

    #[tokio::test]
    async fn test_well_formed_json_is_decoded() {
        let request = new_test_request(Method::PUT, "/", [json_body(serde_json::json!({"a": 1, "b": 2}))]);
        let (headers, raw) = parts(request).await;

        let decoded: Option<HashMap<String, i32>> = JsonRequest::default().read_body(&headers, &raw).unwrap();

        assert_eq!(decoded.unwrap().len(), 2);
    }

    #[test]
    fn test_deserialize_json_masks_empty_input() {
        let decoded: Option<Vec<u8>> = deserialize_json(&b"  \n"[..]).unwrap();
        assert!(decoded.is_none());

        let decoded: Option<Vec<u8>> = deserialize_json(&b"[1,2]"[..]).unwrap();
        assert_eq!(decoded, Some(vec![1, 2]));

        assert!(matches!(deserialize_json::<Vec<u8>, _>(&b"[1,"[..]), Err(DecodeError::Json(_))));
    }

    #[tokio::test]
    async fn test_null_body_reads_as_absent() {
        let request = new_test_request(Method::PUT, "/", [json_body(serde_json::Value::Null)]);
        let (headers, raw) = parts(request).await;

        let decoded: Option<HashMap<String, i32>> = JsonRequest::default().read_body(&headers, &raw).unwrap();
        assert!(decoded.is_none());

        let decoded: Option<Vec<u8>> = deserialize_json(&b" null "[..]).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_is_json_content_type() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/plain"));
        assert!(!is_json_content_type(""));
    }
}
