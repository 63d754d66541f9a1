//! Synthetic inbound requests for tests.
//!
//! The same option pattern as the response side, applied to building an
//! `http::Request` that can be driven through a router without a listener.
//! Fixture failures (unreadable body, unserializable JSON, malformed target)
//! panic: there is no useful way for a test to continue with a broken fixture.

use std::fmt;
use std::io::{self, Read};

use axum::body::Body;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, Uri};
use serde::Serialize;
use url::form_urlencoded;

use crate::response::JSON_CONTENT_TYPE;

/// Request parts accumulated by [`RequestOption`]s.
#[derive(Debug, Default)]
pub struct RequestConfig {
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RequestConfig {
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

type Apply = dyn FnOnce(&mut RequestConfig) + Send;

/// A single-use mutation of a [`RequestConfig`]. The default value is a no-op.
#[derive(Default)]
pub struct RequestOption(Option<Box<Apply>>);

impl RequestOption {
    pub fn new(apply: impl FnOnce(&mut RequestConfig) + Send + 'static) -> Self {
        Self(Some(Box::new(apply)))
    }

    pub fn noop() -> Self {
        Self(None)
    }

    pub fn apply(self, config: &mut RequestConfig) {
        if let Some(apply) = self.0 {
            apply(config);
        }
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() { "RequestOption(..)" } else { "RequestOption(noop)" })
    }
}

/// Combine options into one that applies each in the given order.
pub fn with(options: impl IntoIterator<Item = RequestOption>) -> RequestOption {
    let options: Vec<RequestOption> = options.into_iter().collect();
    RequestOption::new(move |config| {
        for option in options {
            option.apply(config);
        }
    })
}

/// Append a query parameter. Existing parameters in the target are kept.
pub fn query(key: impl Into<String>, value: impl Into<String>) -> RequestOption {
    let pair = (key.into(), value.into());
    RequestOption::new(move |config| config.query.push(pair))
}

/// Append a header value.
pub fn header(key: impl AsRef<str>, value: impl AsRef<str>) -> RequestOption {
    let name = HeaderName::from_bytes(key.as_ref().as_bytes())
        .unwrap_or_else(|err| panic!("invalid test header name {:?}: {}", key.as_ref(), err));
    let value = HeaderValue::from_str(value.as_ref())
        .unwrap_or_else(|err| panic!("invalid test header value {:?}: {}", value.as_ref(), err));
    RequestOption::new(move |config| {
        config.headers.append(name, value);
    })
}

/// Copy everything from `reader` into the body.
pub fn body<R>(mut reader: R) -> RequestOption
where
    R: Read + Send + 'static,
{
    RequestOption::new(move |config| {
        if let Err(err) = io::copy(&mut reader, &mut config.body) {
            panic!("reading test request body: {err}");
        }
    })
}

/// Serialize `value` into the body and add the JSON content type.
pub fn json_body<T>(value: T) -> RequestOption
where
    T: Serialize + Send + 'static,
{
    RequestOption::new(move |config| {
        config
            .headers
            .append(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Err(err) = serde_json::to_writer(&mut config.body, &value) {
            panic!("encoding test request JSON body: {err}");
        }
    })
}

/// Build an inbound request for `method` and `target` (path plus optional query).
pub fn new_test_request(
    method: Method,
    target: &str,
    options: impl IntoIterator<Item = RequestOption>,
) -> Request<Body> {
    let mut config = RequestConfig::default();
    for option in options {
        option.apply(&mut config);
    }

    let target: Uri = target
        .parse()
        .unwrap_or_else(|err| panic!("invalid test request target {target:?}: {err}"));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if let Some(existing) = target.query() {
        serializer.extend_pairs(form_urlencoded::parse(existing.as_bytes()));
    }
    serializer.extend_pairs(config.query.iter());
    let query = serializer.finish();

    let path = match target.path() {
        "" => "/",
        path => path,
    };
    let uri = if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    };

    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(config.body))
        .unwrap_or_else(|err| panic!("building test request: {err}"));
    *request.headers_mut() = config.headers;
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::read::query_values;

    async fn body_string(request: Request<Body>) -> String {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_query_appends_to_target() {
        let request = new_test_request(Method::GET, "/target?a=1", [query("a", "2"), query("b", "1")]);

        assert_eq!(request.uri().path(), "/target");
        assert_eq!(query_values(request.uri(), "a"), ["1", "2"]);
        assert_eq!(query_values(request.uri(), "b"), ["1"]);
    }

    #[test]
    fn test_headers_are_multi_valued() {
        let request = new_test_request(
            Method::GET,
            "/target",
            [header("a", "1"), header("A", "2"), header("b", "2")],
        );

        let a: Vec<_> = request.headers().get_all("a").iter().collect();
        assert_eq!(a, ["1", "2"]);
        assert_eq!(request.headers()["b"], "2");
    }

    #[tokio::test]
    async fn test_body_is_copied() {
        let request = new_test_request(Method::PUT, "/target", [body(&b"Hello, world!"[..])]);
        assert_eq!(body_string(request).await, "Hello, world!");
    }

    #[test]
    #[should_panic(expected = "reading test request body")]
    fn test_body_read_failure_panics() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("read error"))
            }
        }

        new_test_request(Method::GET, "/target", [body(Failing)]);
    }

    #[tokio::test]
    async fn test_json_body_sets_content_type() {
        let request = new_test_request(
            Method::PUT,
            "/target",
            [json_body(serde_json::json!({"a": "1"}))],
        );

        assert_eq!(request.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(body_string(request).await, r#"{"a":"1"}"#);
    }

    #[test]
    #[should_panic(expected = "encoding test request JSON body")]
    fn test_json_body_failure_panics() {
        struct Unserializable;
        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("nope"))
            }
        }

        new_test_request(Method::GET, "/target", [json_body(Unserializable)]);
    }

    #[test]
    fn test_with_nests_in_order() {
        let request = new_test_request(
            Method::GET,
            "/",
            [with([query("k", "1"), with([query("k", "2")]), RequestOption::noop()]), query("k", "3")],
        );
        assert_eq!(query_values(request.uri(), "k"), ["1", "2", "3"]);
    }
}
