use axum::routing::get;
use axum::Router;

use crate::dispatch::Dispatch;

use super::{agents, commands, health};

#[derive(Clone)]
pub struct AppState {
    pub dispatch: Dispatch,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/v1/agents", get(agents::list_agents))
        .route(
            "/v1/agents/{agent_id}",
            get(agents::get_agent).delete(agents::remove_agent),
        )
        .route(
            "/v1/agents/{agent_id}/commands",
            get(commands::list_pending).post(commands::dispatch_command),
        )
        .route(
            "/v1/commands/{command_id}/result",
            get(commands::get_result),
        )
        .with_state(state)
}
