use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fleetmon_common::proto::fleet_service_client::FleetServiceClient;
use fleetmon_common::proto::fleet_service_server::FleetServiceServer;
use fleetmon_common::proto::{
    CommandKind, CommandResult, RegisterRequest, StreamRequest, TelemetryRequest,
    TelemetrySnapshot,
};
use tonic::transport::{Channel, Server};
use tonic::Request;

use fleetmon_server::dispatch::Dispatch;
use fleetmon_server::grpc::FleetServiceImpl;

struct TestServer {
    addr: std::net::SocketAddr,
    dispatch: Dispatch,
    shutdown: Arc<AtomicBool>,
}

impl TestServer {
    async fn start() -> Self {
        let dispatch = Dispatch::new();
        let shutdown = Arc::new(AtomicBool::new(false));

        let svc = FleetServiceImpl::new(dispatch.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown_flag = shutdown.clone();
        tokio::spawn(async move {
            let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);
            Server::builder()
                .add_service(FleetServiceServer::new(svc))
                .serve_with_incoming_shutdown(incoming, async move {
                    while !shutdown_flag.load(Ordering::Relaxed) {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                })
                .await
                .unwrap();
        });

        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            addr,
            dispatch,
            shutdown,
        }
    }

    async fn client(&self) -> FleetServiceClient<Channel> {
        let endpoint = format!("http://{}", self.addr);
        let channel = Channel::from_shared(endpoint)
            .unwrap()
            .connect()
            .await
            .unwrap();
        FleetServiceClient::new(channel)
    }

    fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn sample_register() -> RegisterRequest {
    RegisterRequest {
        hostname: "host-a".into(),
        ip_address: "10.0.0.1".into(),
        mac_address: "aa:bb".into(),
        os_info: "linux".into(),
    }
}

#[tokio::test]
async fn register_assigns_distinct_ids() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let mut ids = Vec::new();
    for _ in 0..5 {
        let resp = client
            .register(Request::new(sample_register()))
            .await
            .unwrap()
            .into_inner();
        assert!(resp.success);
        ids.push(resp.agent_id);
    }

    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());
}

#[tokio::test]
async fn full_command_round_trip() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let reg = client
        .register(Request::new(sample_register()))
        .await
        .unwrap()
        .into_inner();
    let agent_id = reg.agent_id;

    let mut stream = client
        .open_command_stream(Request::new(StreamRequest {
            agent_id: agent_id.clone(),
        }))
        .await
        .unwrap()
        .into_inner();

    // give the stream attach a moment before dispatching
    tokio::time::sleep(Duration::from_millis(50)).await;

    let command = server
        .dispatch
        .dispatch_command(&agent_id, CommandKind::ShellExec, "echo hi".into(), 5)
        .unwrap();

    let received = tokio::time::timeout(Duration::from_secs(2), stream.message())
        .await
        .expect("timed out waiting for pushed command")
        .unwrap()
        .unwrap();
    assert_eq!(received.command_id, command.command_id);
    assert_eq!(received.kind(), CommandKind::ShellExec);
    assert_eq!(received.payload, "echo hi");

    let ack = client
        .report_command_result(Request::new(CommandResult {
            agent_id: agent_id.clone(),
            command_id: command.command_id.clone(),
            success: true,
            output: "hi\n".into(),
            error: String::new(),
            execution_time_ms: 12,
            completed_at_unix: 1_700_000_000,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(ack.received);

    let stored = server.dispatch.get_result(&command.command_id).unwrap();
    assert!(stored.success);
    assert_eq!(stored.output, "hi\n");
    assert!(server.dispatch.list_pending(&agent_id).is_empty());
}

#[tokio::test]
async fn reconnect_replays_all_pending_exactly_once() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let reg = client
        .register(Request::new(sample_register()))
        .await
        .unwrap()
        .into_inner();
    let agent_id = reg.agent_id;

    // queued while no stream is connected
    let c1 = server
        .dispatch
        .dispatch_command(&agent_id, CommandKind::ShellExec, "ls".into(), 5)
        .unwrap();
    let c2 = server
        .dispatch
        .dispatch_command(&agent_id, CommandKind::InfoQuery, "cpu".into(), 5)
        .unwrap();

    let mut stream = client
        .open_command_stream(Request::new(StreamRequest {
            agent_id: agent_id.clone(),
        }))
        .await
        .unwrap()
        .into_inner();

    let mut got = Vec::new();
    for _ in 0..2 {
        let cmd = tokio::time::timeout(Duration::from_secs(2), stream.message())
            .await
            .expect("timed out waiting for replay")
            .unwrap()
            .unwrap();
        got.push(cmd.command_id);
    }
    got.sort();

    let mut expected = vec![c1.command_id, c2.command_id];
    expected.sort();
    assert_eq!(got, expected);

    // no third delivery
    let extra = tokio::time::timeout(Duration::from_millis(200), stream.message()).await;
    assert!(extra.is_err());
}

#[tokio::test]
async fn stream_for_unknown_agent_aborts() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let err = client
        .open_command_stream(Request::new(StreamRequest {
            agent_id: "ghost".into(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), tonic::Code::NotFound);
}

#[tokio::test]
async fn dispatch_to_unknown_agent_fails() {
    let server = TestServer::start().await;

    let err = server
        .dispatch
        .dispatch_command("ZZZ", CommandKind::ShellExec, "whoami".into(), 5)
        .unwrap_err();
    assert!(err.to_string().contains("unknown agent"));
}

#[tokio::test]
async fn result_for_unissued_command_refused() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let reg = client
        .register(Request::new(sample_register()))
        .await
        .unwrap()
        .into_inner();

    let ack = client
        .report_command_result(Request::new(CommandResult {
            agent_id: reg.agent_id,
            command_id: "cmd-never-issued".into(),
            success: true,
            output: String::new(),
            error: String::new(),
            execution_time_ms: 0,
            completed_at_unix: 0,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(!ack.received);
    assert!(server.dispatch.get_result("cmd-never-issued").is_err());
}

#[tokio::test]
async fn telemetry_updates_agent_record() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let reg = client
        .register(Request::new(sample_register()))
        .await
        .unwrap()
        .into_inner();

    let resp = client
        .push_telemetry(Request::new(TelemetryRequest {
            agent_id: reg.agent_id.clone(),
            snapshot: Some(TelemetrySnapshot::default()),
            timestamp_unix: 1_700_000_000,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(resp.received);

    let record = server.dispatch.get_agent(&reg.agent_id).unwrap();
    assert!(record.snapshot.is_some());

    let refused = client
        .push_telemetry(Request::new(TelemetryRequest {
            agent_id: "ghost".into(),
            snapshot: None,
            timestamp_unix: 0,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(!refused.received);
}
