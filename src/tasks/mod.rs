//! Task service built on the framework.
//!
//! # Responsibilities
//! - `PUT /tasks` creates a task (pooled-model shell, composed options)
//! - `DELETE /tasks?id=N` removes one (direct [`JsonResponder`](crate::response::JsonResponder) writes)
//! - [`TaskStore`] keeps tasks in memory
//!
//! Handlers never touch storage directly. They fill a command and pass it to a
//! [`TaskHandler`], which reports the outcome in the command's result fields.

pub mod app;
pub mod create;
pub mod delete;
pub mod errors;

use std::sync::Arc;

use axum::routing::{self, MethodFilter};
use axum::Router;

use crate::config::ServerConfig;
use crate::framework::{self, Framework};
use crate::request::JsonRequest;

pub use app::{Command, CreateTaskCommand, DeleteTaskCommand, TaskError, TaskHandler, TaskStore};
pub use create::{CreateTaskModel, CreateTaskRequest, CreateTaskResponse, CreateTaskShell};
pub use delete::{delete_task, DeleteTaskShell};

/// Routes for `/tasks`, dispatching commands to `handler`.
pub fn router(config: &ServerConfig, handler: Arc<dyn TaskHandler>) -> Router {
    let json = JsonRequest::new(config.request.content_type_policy);
    let create = Arc::new(Framework::pooled(
        CreateTaskShell::new(handler.clone(), json),
        config.pool.max_idle,
        config.request.max_body_bytes,
    ));
    let remove = Arc::new(DeleteTaskShell::new(handler));

    Router::new().route(
        "/tasks",
        framework::route(create, MethodFilter::PUT).merge(routing::delete(delete_task).with_state(remove)),
    )
}
