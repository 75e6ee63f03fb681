use tokio_stream::wrappers::UnboundedReceiverStream;
use tonic::{Request, Response, Status};

use fleetmon_common::proto::fleet_service_server::FleetService;
use fleetmon_common::proto::{
    Command, CommandResult, RegisterRequest, RegisterResponse, ResultAck, StreamRequest,
    TelemetryRequest, TelemetryResponse,
};

use crate::dispatch::Dispatch;

use super::command_stream::handle_open_stream;
use super::register::handle_register;
use super::report_result::handle_report_result;
use super::telemetry::handle_push_telemetry;

pub struct FleetServiceImpl {
    dispatch: Dispatch,
}

impl FleetServiceImpl {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }
}

#[tonic::async_trait]
impl FleetService for FleetServiceImpl {
    type OpenCommandStreamStream = UnboundedReceiverStream<Result<Command, Status>>;

    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        handle_register(&self.dispatch, request).await
    }

    async fn push_telemetry(
        &self,
        request: Request<TelemetryRequest>,
    ) -> Result<Response<TelemetryResponse>, Status> {
        handle_push_telemetry(&self.dispatch, request).await
    }

    async fn open_command_stream(
        &self,
        request: Request<StreamRequest>,
    ) -> Result<Response<Self::OpenCommandStreamStream>, Status> {
        handle_open_stream(&self.dispatch, request).await
    }

    async fn report_command_result(
        &self,
        request: Request<CommandResult>,
    ) -> Result<Response<ResultAck>, Status> {
        handle_report_result(&self.dispatch, request).await
    }
}
