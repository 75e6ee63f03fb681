use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fleetmon_common::proto::{Command, CommandKind, CommandResult};
use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchError;

use super::error::{bad_request, not_found, ApiError};
use super::AppState;

#[derive(Deserialize)]
pub struct DispatchBody {
    pub kind: String,
    #[serde(default)]
    pub payload: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: i32,
}

fn default_timeout() -> i32 {
    30
}

#[derive(Serialize)]
pub struct DispatchResponse {
    pub command_id: String,
}

#[derive(Serialize)]
pub struct CommandView {
    pub command_id: String,
    pub kind: String,
    pub payload: String,
    pub timeout_seconds: i32,
    pub issued_at_unix: i64,
}

#[derive(Serialize)]
pub struct ResultView {
    pub agent_id: String,
    pub command_id: String,
    pub success: bool,
    pub output: String,
    pub error: String,
    pub execution_time_ms: i64,
    pub completed_at_unix: i64,
}

fn parse_kind(kind: &str) -> Option<CommandKind> {
    match kind {
        "shell-exec" => Some(CommandKind::ShellExec),
        "info-query" => Some(CommandKind::InfoQuery),
        "update" => Some(CommandKind::Update),
        _ => None,
    }
}

fn kind_label(command: &Command) -> &'static str {
    match command.kind() {
        CommandKind::ShellExec => "shell-exec",
        CommandKind::InfoQuery => "info-query",
        CommandKind::Update => "update",
        CommandKind::Unspecified => "unspecified",
    }
}

pub async fn dispatch_command(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<DispatchBody>,
) -> Result<(StatusCode, Json<DispatchResponse>), ApiError> {
    let kind = parse_kind(&body.kind)
        .ok_or_else(|| bad_request(format!("unknown command kind: {}", body.kind)))?;

    let command = state
        .dispatch
        .dispatch_command(&agent_id, kind, body.payload, body.timeout_seconds)
        .map_err(|e| match e {
            DispatchError::UnknownAgent(_) => not_found(e.to_string()),
            _ => bad_request(e.to_string()),
        })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DispatchResponse {
            command_id: command.command_id,
        }),
    ))
}

pub async fn list_pending(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<CommandView>>, ApiError> {
    if !state.dispatch.agent_exists(&agent_id) {
        return Err(not_found(format!("unknown agent id: {agent_id}")));
    }

    let pending = state
        .dispatch
        .list_pending(&agent_id)
        .into_iter()
        .map(|c| CommandView {
            kind: kind_label(&c).into(),
            command_id: c.command_id,
            payload: c.payload,
            timeout_seconds: c.timeout_seconds,
            issued_at_unix: c.issued_at_unix,
        })
        .collect();
    Ok(Json(pending))
}

pub async fn get_result(
    State(state): State<AppState>,
    Path(command_id): Path<String>,
) -> Result<Json<ResultView>, ApiError> {
    state
        .dispatch
        .get_result(&command_id)
        .map(|r: CommandResult| {
            Json(ResultView {
                agent_id: r.agent_id,
                command_id: r.command_id,
                success: r.success,
                output: r.output,
                error: r.error,
                execution_time_ms: r.execution_time_ms,
                completed_at_unix: r.completed_at_unix,
            })
        })
        .map_err(|e| not_found(e.to_string()))
}
