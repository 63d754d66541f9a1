//! Axum integration.
//!
//! # Data Flow
//! ```text
//! axum request
//!     → buffer body (size limit → 413 envelope)
//!     → Shell::serve (ResponseOption, no I/O)
//!     → flush into ResponseRecorder (failures logged, never retried)
//!     → axum Response
//! ```
//!
//! `PooledShell` adds a per-request model checked out of a [`Pool`] and reset
//! before each use, so handlers can reuse scratch state across requests. The
//! model stays checked out until the response has been flushed.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter, MethodRouter};
use http::{Method, Request, StatusCode, Uri};
use http_body_util::LengthLimitError;

use crate::errors::{INVALID_REQUEST_JSON_BODY, REQUEST_BODY_TOO_LARGE};
use crate::observability::metrics;
use crate::pool::Pool;
use crate::response::{flush, json_errors, ResponseOption, ResponseRecorder};

/// Turns a buffered request into a response option.
pub trait Shell: Send + Sync + 'static {
    fn serve(&self, request: &Request<Bytes>) -> ResponseOption;

    /// Serve `request` and flush the result.
    fn respond(&self, request: &Request<Bytes>) -> Response {
        respond(request.method(), request.uri(), &[self.serve(request)])
    }
}

impl<F> Shell for F
where
    F: Fn(&Request<Bytes>) -> ResponseOption + Send + Sync + 'static,
{
    fn serve(&self, request: &Request<Bytes>) -> ResponseOption {
        self(request)
    }
}

/// A shell that works on a pooled per-request model.
pub trait ModelShell: Send + Sync + 'static {
    type Model: Send + 'static;

    fn create_model() -> Self::Model;

    /// Restore every field of a reused model to its initial value.
    fn reset_model(model: &mut Self::Model);

    fn serve(&self, request: &Request<Bytes>, model: &mut Self::Model) -> ResponseOption;
}

/// Adapts a [`ModelShell`] into a [`Shell`] backed by a model pool.
pub struct PooledShell<S: ModelShell> {
    shell: S,
    models: Pool<S::Model>,
}

impl<S: ModelShell> PooledShell<S> {
    pub fn new(shell: S, max_idle: usize) -> Self {
        Self {
            shell,
            models: Pool::with_max_idle(S::create_model, max_idle),
        }
    }

    pub fn idle_models(&self) -> usize {
        self.models.idle()
    }
}

impl<S: ModelShell> Shell for PooledShell<S> {
    /// The model goes back to the pool before the option is flushed;
    /// [`Shell::respond`] keeps it checked out through the flush.
    fn serve(&self, request: &Request<Bytes>) -> ResponseOption {
        let mut model = self.models.checkout();
        S::reset_model(&mut model);
        self.shell.serve(request, &mut model)
    }

    fn respond(&self, request: &Request<Bytes>) -> Response {
        let mut model = self.models.checkout();
        S::reset_model(&mut model);
        let option = self.shell.serve(request, &mut model);
        let response = respond(request.method(), request.uri(), &[option]);
        drop(model);
        response
    }
}

/// Serves HTTP requests through a [`Shell`].
pub struct Framework<S: Shell> {
    shell: S,
    max_body_bytes: usize,
}

pub type PooledModelFramework<S> = Framework<PooledShell<S>>;

impl<S: Shell> Framework<S> {
    pub fn new(shell: S, max_body_bytes: usize) -> Self {
        Self { shell, max_body_bytes }
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub async fn handle(&self, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();
        let bytes = match axum::body::to_bytes(body, self.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(err) => {
                let rejected = body_rejection(err);
                return respond(&parts.method, &parts.uri, &[rejected]);
            }
        };

        self.shell.respond(&Request::from_parts(parts, bytes))
    }
}

impl<M: ModelShell> Framework<PooledShell<M>> {
    pub fn pooled(shell: M, max_idle: usize, max_body_bytes: usize) -> Self {
        Self::new(PooledShell::new(shell, max_idle), max_body_bytes)
    }
}

/// An axum method router that dispatches `filter` requests to `framework`.
pub fn route<S: Shell>(framework: Arc<Framework<S>>, filter: MethodFilter) -> MethodRouter {
    on(filter, move |request: Request<Body>| async move { framework.handle(request).await })
}

/// Flush `options` into a fresh recorder and convert it to an axum response.
pub fn respond(method: &Method, uri: &Uri, options: &[ResponseOption]) -> Response {
    let mut recorder = ResponseRecorder::new();
    if let Err(err) = flush(&mut recorder, options) {
        tracing::warn!(
            method = %method,
            path = %uri.path(),
            error = %err,
            "Failed to write response body"
        );
        metrics::record_flush_failure();
    }
    metrics::record_response(recorder.status());
    recorder.into_response()
}

fn body_rejection(err: axum::Error) -> ResponseOption {
    let too_large = err.into_inner().downcast_ref::<LengthLimitError>().is_some();
    if too_large {
        json_errors(StatusCode::PAYLOAD_TOO_LARGE, [REQUEST_BODY_TOO_LARGE])
    } else {
        json_errors(StatusCode::BAD_REQUEST, [INVALID_REQUEST_JSON_BODY])
    }
}
