//! `DELETE /tasks?id=N` written directly with a [`JsonResponder`].

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::{StatusCode, Uri};

use crate::errors::Errors;
use crate::observability::metrics;
use crate::request::read::query_value;
use crate::response::{JsonResponder, ResponseRecorder, ResponseSink};
use crate::tasks::app::{Command, DeleteTaskCommand, TaskError, TaskHandler};
use crate::tasks::errors::{INTERNAL_SERVER_ERROR, INVALID_ID};

pub struct DeleteTaskShell {
    handler: Arc<dyn TaskHandler>,
    responder: JsonResponder,
}

impl DeleteTaskShell {
    pub fn new(handler: Arc<dyn TaskHandler>) -> Self {
        Self {
            handler,
            responder: JsonResponder::new(),
        }
    }

    /// Write the outcome of deleting the task named by the `id` query value.
    pub fn serve<S: ResponseSink + ?Sized>(&self, sink: &mut S, uri: &Uri) {
        let Ok(id) = query_value(uri, "id").parse::<u64>() else {
            self.respond_errors(sink, StatusCode::BAD_REQUEST, Errors::new([INVALID_ID]));
            return;
        };

        let mut command = DeleteTaskCommand { id, ..Default::default() };
        self.handler.handle(Command::DeleteTask(&mut command));

        match command.result.error {
            None => sink.write_status(StatusCode::NO_CONTENT),
            Some(TaskError::NotFound) => sink.write_status(StatusCode::NOT_FOUND),
            Some(err) => {
                tracing::error!(task_id = id, error = %err, "Delete task failed");
                self.respond_errors(
                    sink,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Errors::new([INTERNAL_SERVER_ERROR]),
                );
            }
        }
    }

    fn respond_errors<S: ResponseSink + ?Sized>(&self, sink: &mut S, status: StatusCode, errors: Errors) {
        if let Err(err) = self.responder.respond(sink, status, &errors) {
            tracing::warn!(error = %err, "Failed to write response body");
            metrics::record_flush_failure();
        }
    }
}

/// Axum handler for [`DeleteTaskShell`].
pub async fn delete_task(State(shell): State<Arc<DeleteTaskShell>>, uri: Uri) -> Response {
    let mut recorder = ResponseRecorder::new();
    shell.serve(&mut recorder, &uri);
    metrics::record_response(recorder.status());
    recorder.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve(shell: &DeleteTaskShell, target: &str) -> ResponseRecorder {
        let mut recorder = ResponseRecorder::new();
        shell.serve(&mut recorder, &target.parse().unwrap());
        recorder
    }

    #[test]
    fn test_non_numeric_id() {
        let shell = DeleteTaskShell::new(Arc::new(|_: Command<'_>| panic!("handler must not run")));

        let recorder = serve(&shell, "/tasks?id=INVALID");

        assert_eq!(recorder.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(recorder.body()).unwrap();
        assert_eq!(body["errors"][0]["name"], "invalid-id");
        assert_eq!(body["errors"][0]["fields"][0], "id");
    }

    #[test]
    fn test_handler_sees_parsed_id() {
        let shell = DeleteTaskShell::new(Arc::new(|command: Command<'_>| {
            let Command::DeleteTask(command) = command else {
                panic!("unexpected command");
            };
            assert_eq!(command.id, 42);
        }));

        let recorder = serve(&shell, "/tasks?id=42");

        assert_eq!(recorder.status(), StatusCode::NO_CONTENT);
        assert!(recorder.body().is_empty());
    }
}
