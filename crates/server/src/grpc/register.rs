use tonic::{Request, Response, Status};

use fleetmon_common::proto::{RegisterRequest, RegisterResponse};

use crate::dispatch::Dispatch;

/// Registration always succeeds and always mints a fresh id; no
/// deduplication by hostname or address is attempted.
pub async fn handle_register(
    dispatch: &Dispatch,
    request: Request<RegisterRequest>,
) -> Result<Response<RegisterResponse>, Status> {
    let req = request.into_inner();

    let agent_id = dispatch.register_agent(
        req.hostname.clone(),
        req.ip_address.clone(),
        req.mac_address,
        req.os_info,
    );

    tracing::info!(
        agent_id = %agent_id,
        hostname = %req.hostname,
        ip = %req.ip_address,
        "agent registered"
    );

    Ok(Response::new(RegisterResponse {
        agent_id,
        success: true,
        message: "registered".into(),
    }))
}
