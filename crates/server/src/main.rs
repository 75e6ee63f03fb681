use fleetmon_common::proto::fleet_service_server::FleetServiceServer;
use fleetmon_server::config::ServerConfig;
use fleetmon_server::dispatch::Dispatch;
use fleetmon_server::grpc::FleetServiceImpl;
use fleetmon_server::rest::{self, AppState};
use tonic::transport::Server as TonicServer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::default();
    let dispatch = Dispatch::new();

    let grpc_service = FleetServiceImpl::new(dispatch.clone());
    let grpc_addr = config.grpc_addr;

    let grpc_handle = tokio::spawn(async move {
        tracing::info!(%grpc_addr, "gRPC server starting");
        TonicServer::builder()
            .add_service(FleetServiceServer::new(grpc_service))
            .serve(grpc_addr)
            .await
            .expect("gRPC server failed");
    });

    let rest_app = rest::router(AppState { dispatch });
    let rest_addr = config.rest_addr;

    let rest_handle = tokio::spawn(async move {
        tracing::info!(%rest_addr, "management API starting");
        let listener = tokio::net::TcpListener::bind(rest_addr)
            .await
            .expect("failed to bind management API");
        axum::serve(listener, rest_app)
            .await
            .expect("management API failed");
    });

    tokio::select! {
        r = grpc_handle => { if let Err(e) = r { tracing::error!("gRPC: {e}"); } }
        r = rest_handle => { if let Err(e) = r { tracing::error!("management API: {e}"); } }
    }
}
