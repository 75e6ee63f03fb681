use tonic::{Request, Response, Status};

use fleetmon_common::proto::{TelemetryRequest, TelemetryResponse};

use crate::dispatch::Dispatch;

/// Domain failures come back as `received=false` with the error message;
/// they are never turned into transport faults.
pub async fn handle_push_telemetry(
    dispatch: &Dispatch,
    request: Request<TelemetryRequest>,
) -> Result<Response<TelemetryResponse>, Status> {
    let req = request.into_inner();
    let snapshot = req.snapshot.unwrap_or_default();

    let cpu_pct = snapshot.cpu.as_ref().map(|c| c.usage_percent);
    let mem_pct = snapshot.memory.as_ref().map(|m| m.usage_percent);

    match dispatch.update_telemetry(&req.agent_id, snapshot) {
        Ok(()) => {
            tracing::debug!(
                agent_id = %req.agent_id,
                ts = req.timestamp_unix,
                cpu_pct,
                mem_pct,
                "telemetry received"
            );
            Ok(Response::new(TelemetryResponse {
                received: true,
                message: "telemetry received".into(),
            }))
        }
        Err(e) => Ok(Response::new(TelemetryResponse {
            received: false,
            message: e.to_string(),
        })),
    }
}
