use tonic::{Request, Response, Status};

use fleetmon_common::proto::{CommandResult, ResultAck};

use crate::dispatch::Dispatch;

/// A result is accepted only when its command id is currently pending for
/// the reporting agent; anything else is refused with `received=false` and
/// leaves the result store untouched.
pub async fn handle_report_result(
    dispatch: &Dispatch,
    request: Request<CommandResult>,
) -> Result<Response<ResultAck>, Status> {
    let result = request.into_inner();
    let agent_id = result.agent_id.clone();
    let command_id = result.command_id.clone();
    let success = result.success;

    match dispatch.report_result(result) {
        Ok(()) => {
            tracing::info!(
                agent_id = %agent_id,
                command_id = %command_id,
                success,
                "command result recorded"
            );
            Ok(Response::new(ResultAck {
                received: true,
                message: "result recorded".into(),
            }))
        }
        Err(e) => {
            tracing::warn!(
                agent_id = %agent_id,
                command_id = %command_id,
                error = %e,
                "command result refused"
            );
            Ok(Response::new(ResultAck {
                received: false,
                message: e.to_string(),
            }))
        }
    }
}
