//! `PUT /tasks` served by a pooled-model shell.

use std::sync::Arc;

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use http::{Request, StatusCode};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::framework::ModelShell;
use crate::request::JsonRequest;
use crate::response::{json_body, json_errors, status_code, with, ResponseOption};
use crate::tasks::app::{Command, CreateTaskCommand, TaskError, TaskHandler};
use crate::tasks::errors::{INTERNAL_SERVER_ERROR, MISSING_DETAILS, MISSING_DUE_DATE, TASK_TOO_HARD};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreateTaskRequest {
    pub details: String,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateTaskResponse {
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub details: String,
}

fn is_zero(id: &u64) -> bool {
    *id == 0
}

/// Scratch state for one create request. Reused across requests.
#[derive(Debug, Default)]
pub struct CreateTaskModel {
    pub request: CreateTaskRequest,
    pub command: CreateTaskCommand,
    pub response: CreateTaskResponse,
    problems: Vec<Error>,
}

pub struct CreateTaskShell {
    handler: Arc<dyn TaskHandler>,
    json: JsonRequest,
}

impl CreateTaskShell {
    pub fn new(handler: Arc<dyn TaskHandler>, json: JsonRequest) -> Self {
        Self { handler, json }
    }

    fn validate(model: &mut CreateTaskModel) -> Option<ResponseOption> {
        if model.request.due_date.is_none() {
            model.problems.push(MISSING_DUE_DATE);
        }
        if model.request.details.trim().is_empty() {
            model.problems.push(MISSING_DETAILS);
        }
        if model.problems.is_empty() {
            return None;
        }
        Some(json_errors(
            StatusCode::UNPROCESSABLE_ENTITY,
            model.problems.drain(..),
        ))
    }

    fn created(model: &mut CreateTaskModel) -> ResponseOption {
        model.response.id = model.command.result.id;
        model.response.details.clone_from(&model.request.details);
        with([
            status_code(StatusCode::CREATED),
            json_body(model.response.clone()),
        ])
    }
}

impl ModelShell for CreateTaskShell {
    type Model = CreateTaskModel;

    fn create_model() -> Self::Model {
        CreateTaskModel::default()
    }

    fn reset_model(model: &mut Self::Model) {
        model.request.details.clear();
        model.request.due_date = None;
        model.command.details.clear();
        model.command.due_date = None;
        model.command.result.id = 0;
        model.command.result.error = None;
        model.response.id = 0;
        model.response.details.clear();
        model.problems.clear();
    }

    fn serve(&self, request: &Request<Bytes>, model: &mut Self::Model) -> ResponseOption {
        match self.json.read_body::<CreateTaskRequest>(request.headers(), request.body()) {
            Ok(Some(body)) => model.request = body,
            Ok(None) => {}
            Err(rejected) => return rejected,
        }

        if let Some(invalid) = Self::validate(model) {
            return invalid;
        }

        model.command.details.clone_from(&model.request.details);
        model.command.due_date = model.request.due_date;
        self.handler.handle(Command::CreateTask(&mut model.command));

        match model.command.result.error.take() {
            None if model.command.result.id > 0 => Self::created(model),
            Some(TaskError::TooHard) => json_errors(StatusCode::IM_A_TEAPOT, [TASK_TOO_HARD]),
            Some(err) => {
                tracing::error!(error = %err, "Create task failed");
                json_errors(StatusCode::INTERNAL_SERVER_ERROR, [INTERNAL_SERVER_ERROR])
            }
            None => {
                tracing::error!("Create task returned no id");
                json_errors(StatusCode::INTERNAL_SERVER_ERROR, [INTERNAL_SERVER_ERROR])
            }
        }
    }
}
