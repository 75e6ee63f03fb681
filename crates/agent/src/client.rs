use tonic::transport::Channel;
use tonic::{Request, Status, Streaming};

use fleetmon_common::proto::fleet_service_client::FleetServiceClient;
use fleetmon_common::proto::{
    Command, CommandResult, RegisterRequest, RegisterResponse, ResultAck, StreamRequest,
    TelemetryRequest, TelemetrySnapshot,
};

#[derive(Debug)]
pub enum ClientError {
    Transport(tonic::transport::Error),
    Rpc(Status),
    Rejected(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Rpc(s) => write!(f, "rpc: {s}"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<tonic::transport::Error> for ClientError {
    fn from(e: tonic::transport::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<Status> for ClientError {
    fn from(s: Status) -> Self {
        Self::Rpc(s)
    }
}

/// Thin wrapper over the generated client; clone-per-task.
#[derive(Clone)]
pub struct ServerClient {
    client: FleetServiceClient<Channel>,
}

impl ServerClient {
    pub async fn connect(endpoint: &str) -> Result<Self, ClientError> {
        let channel = Channel::from_shared(endpoint.to_string())
            .map_err(|e| ClientError::Rejected(format!("invalid server endpoint: {e}")))?
            .connect()
            .await?;
        Ok(Self {
            client: FleetServiceClient::new(channel),
        })
    }

    pub async fn register(&mut self, req: RegisterRequest) -> Result<RegisterResponse, ClientError> {
        let resp = self.client.register(Request::new(req)).await?.into_inner();
        if !resp.success {
            return Err(ClientError::Rejected(resp.message));
        }
        Ok(resp)
    }

    pub async fn push_telemetry(
        &mut self,
        agent_id: &str,
        snapshot: TelemetrySnapshot,
    ) -> Result<(), ClientError> {
        let req = TelemetryRequest {
            agent_id: agent_id.to_string(),
            snapshot: Some(snapshot),
            timestamp_unix: now_unix(),
        };
        let resp = self
            .client
            .push_telemetry(Request::new(req))
            .await?
            .into_inner();
        if !resp.received {
            return Err(ClientError::Rejected(resp.message));
        }
        Ok(())
    }

    pub async fn open_command_stream(
        &mut self,
        agent_id: &str,
    ) -> Result<Streaming<Command>, ClientError> {
        let resp = self
            .client
            .open_command_stream(Request::new(StreamRequest {
                agent_id: agent_id.to_string(),
            }))
            .await?;
        Ok(resp.into_inner())
    }

    /// Returns the ack as-is; the reporter decides whether a refusal is
    /// worth retrying.
    pub async fn report_result(&mut self, result: CommandResult) -> Result<ResultAck, ClientError> {
        let resp = self
            .client
            .report_command_result(Request::new(result))
            .await?;
        Ok(resp.into_inner())
    }
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
