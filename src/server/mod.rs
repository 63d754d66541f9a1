//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the axum router for the task service
//! - Wire up middleware (timeout, request ID, tracing)
//! - Serve on a listener until a shutdown signal arrives
//!
//! # Design Decisions
//! - Request IDs are generated (UUID v4) when absent and echoed back
//! - Shutdown is graceful: in-flight requests finish before `run` returns

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::tasks::{self, TaskHandler};

/// HTTP server for the task service.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server that dispatches task commands to `handler`.
    pub fn new(config: ServerConfig, handler: Arc<dyn TaskHandler>) -> Self {
        let router = Self::build_router(&config, handler);
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    pub fn build_router(config: &ServerConfig, handler: Arc<dyn TaskHandler>) -> Router {
        tasks::router(config, handler)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.listener.request_timeout_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving without a socket (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve until `shutdown` completes.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

const X_REQUEST_ID: &str = "x-request-id";

/// The request span, carrying the ID stamped by `SetRequestIdLayer`.
fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request.headers()),
    )
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::Mutex;
    use tower::ServiceExt;
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Collects the `request_id` field of every new span.
    #[derive(Clone, Default)]
    struct RequestIds(Arc<Mutex<Vec<String>>>);

    struct RequestIdField<'a>(&'a mut Vec<String>);

    impl Visit for RequestIdField<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "request_id" {
                self.0.push(format!("{value:?}"));
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for RequestIds {
        fn on_new_span(&self, attrs: &Attributes<'_>, _: &Id, _: Context<'_, S>) {
            let mut ids = self.0.lock().unwrap();
            attrs.record(&mut RequestIdField(&mut ids));
        }
    }

    #[test]
    fn test_request_id_is_read_from_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");

        headers.insert(X_REQUEST_ID, "abc-123".parse().unwrap());
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[tokio::test]
    async fn test_request_span_records_request_id() {
        let ids = RequestIds::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(ids.clone()));
        let router = HttpServer::build_router(
            &ServerConfig::default(),
            Arc::new(crate::tasks::TaskStore::new()),
        );

        let supplied = Request::delete("/tasks?id=1")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(supplied).await.unwrap();

        let generated = Request::delete("/tasks?id=1").body(Body::empty()).unwrap();
        router.oneshot(generated).await.unwrap();

        let ids = ids.0.lock().unwrap().clone();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], "abc-123");
        assert_eq!(ids[1].len(), 36, "expected a generated UUID, got {}", ids[1]);
    }
}
