//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{HeaderMap, Request, StatusCode};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceExt;

use replykit::config::ServerConfig;
use replykit::response::{flush, ResponseOption, ResponseRecorder};
use replykit::tasks::TaskHandler;
use replykit::HttpServer;

/// The full middleware stack over `handler`, with default configuration.
pub fn app(handler: impl TaskHandler) -> Router {
    app_with_config(&ServerConfig::default(), handler)
}

pub fn app_with_config(config: &ServerConfig, handler: impl TaskHandler) -> Router {
    HttpServer::build_router(config, Arc::new(handler))
}

/// A response captured off the router.
#[derive(Debug)]
pub struct Captured {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub async fn send(router: Router, request: Request<Body>) -> Captured {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Captured {
        status,
        headers,
        body: body.to_vec(),
    }
}

/// Serve `request` through `router` and compare the result with what
/// flushing `expected` into a recorder produces. Only headers named by the
/// expected response are compared; JSON bodies are compared structurally.
pub async fn assert_full_http(router: Router, request: Request<Body>, expected: ResponseOption) {
    let actual = send(router, request).await;

    let mut want = ResponseRecorder::new();
    flush(&mut want, &[expected]).unwrap();

    assert_eq!(actual.status, want.status(), "status");
    for key in want.headers().keys() {
        let want_values: Vec<_> = want.headers().get_all(key).iter().collect();
        let got_values: Vec<_> = actual.headers.get_all(key).iter().collect();
        assert_eq!(got_values, want_values, "header {key}");
    }
    assert_body_eq(&actual.body, want.body());
}

pub fn assert_body_eq(actual: &[u8], expected: &[u8]) {
    let as_json = (
        serde_json::from_slice::<serde_json::Value>(actual),
        serde_json::from_slice::<serde_json::Value>(expected),
    );
    match as_json {
        (Ok(actual), Ok(expected)) => assert_eq!(actual, expected, "body"),
        _ => assert_eq!(
            String::from_utf8_lossy(actual),
            String::from_utf8_lossy(expected),
            "body"
        ),
    }
}

/// Serve `router` on an ephemeral port. Dropping the sender stops the server.
pub async fn start_server(router: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (addr, tx)
}
