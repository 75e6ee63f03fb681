use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::store::AgentRecord;

use super::error::{not_found, ApiError};
use super::AppState;

#[derive(Serialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub hostname: String,
    pub ip_address: String,
    pub mac_address: String,
    pub os_info: String,
    pub registered_at_ms: i64,
    pub last_seen_ms: i64,
    pub connected: bool,
    pub pending_commands: usize,
    pub cpu_usage_percent: Option<f64>,
    pub memory_usage_percent: Option<f64>,
}

fn summarize(state: &AppState, record: AgentRecord) -> AgentSummary {
    let cpu_usage_percent = record
        .snapshot
        .as_ref()
        .and_then(|s| s.cpu.as_ref())
        .map(|c| c.usage_percent);
    let memory_usage_percent = record
        .snapshot
        .as_ref()
        .and_then(|s| s.memory.as_ref())
        .map(|m| m.usage_percent);

    AgentSummary {
        connected: state.dispatch.stream_connected(&record.agent_id),
        pending_commands: state.dispatch.pending_count(&record.agent_id),
        cpu_usage_percent,
        memory_usage_percent,
        agent_id: record.agent_id,
        hostname: record.hostname,
        ip_address: record.ip_address,
        mac_address: record.mac_address,
        os_info: record.os_info,
        registered_at_ms: record.registered_at_ms,
        last_seen_ms: record.last_seen_ms,
    }
}

pub async fn list_agents(State(state): State<AppState>) -> Json<Vec<AgentSummary>> {
    let agents = state
        .dispatch
        .list_agents()
        .into_iter()
        .map(|r| summarize(&state, r))
        .collect();
    Json(agents)
}

pub async fn get_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentSummary>, ApiError> {
    state
        .dispatch
        .get_agent(&agent_id)
        .map(|r| Json(summarize(&state, r)))
        .ok_or_else(|| not_found(format!("unknown agent id: {agent_id}")))
}

pub async fn remove_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch
        .remove_agent(&agent_id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| not_found(e.to_string()))
}
