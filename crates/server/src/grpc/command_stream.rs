use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tonic::{Request, Response, Status};

use fleetmon_common::proto::{Command, StreamRequest};

use crate::dispatch::Dispatch;

/// Opens the long-lived command push stream for one agent: validates the
/// id, registers the handle, replays the pending set in one burst, then
/// leaves the channel open for live pushes. The server sends no teardown
/// notice; the agent detects the break itself.
pub async fn handle_open_stream(
    dispatch: &Dispatch,
    request: Request<StreamRequest>,
) -> Result<Response<UnboundedReceiverStream<Result<Command, Status>>>, Status> {
    let req = request.into_inner();

    if req.agent_id.is_empty() {
        return Err(Status::invalid_argument("agent_id is required"));
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let replayed = dispatch
        .attach_stream(&req.agent_id, tx.clone())
        .map_err(|e| Status::not_found(e.to_string()))?;

    tracing::info!(agent_id = %req.agent_id, replayed, "command stream opened");

    // Deregister once the client goes away. `closed()` resolves when the
    // receiver half is dropped, i.e. when tonic tears the stream down.
    let dispatch = dispatch.clone();
    let agent_id = req.agent_id.clone();
    tokio::spawn(async move {
        tx.closed().await;
        dispatch.detach_stream(&agent_id, &tx);
        tracing::info!(agent_id = %agent_id, "command stream closed");
    });

    Ok(Response::new(UnboundedReceiverStream::new(rx)))
}
