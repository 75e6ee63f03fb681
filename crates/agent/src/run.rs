use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use fleetmon_common::proto::RegisterRequest;
use fleetmon_common::retry::RetryConfig;

use crate::client::ServerClient;
use crate::collector::{AgentIdentity, SystemCollector};
use crate::config::AgentConfig;
use crate::executor;
use crate::reporter::Reporter;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const MAX_CONCURRENT_COMMANDS: usize = 8;

pub async fn run(config: AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    let identity = AgentIdentity::discover();
    info!(
        hostname = %identity.hostname,
        server = %config.server,
        interval_s = config.collect.interval_seconds,
        "agent configured"
    );

    let (client, agent_id) = register_with_retry(&config.server, &identity).await;
    info!(agent_id = %agent_id, "registered");

    let report_policy = RetryConfig::fixed(
        config.report.max_attempts,
        Duration::from_secs(config.report.retry_delay_seconds),
    );
    let reporter = Arc::new(Reporter::new(client.clone(), report_policy));

    spawn_telemetry_loop(
        client.clone(),
        agent_id.clone(),
        config.collect.interval_seconds,
    );
    spawn_stream_consumer(client, agent_id, reporter);

    info!("agent running");
    wait_for_shutdown().await;
    info!("shutting down");

    Ok(())
}

/// Blocks until ctrl-c or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "no SIGTERM handler, ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

/// Keeps trying until the server accepts us. The server never reuses
/// ids, so a retry after a half-completed attempt just yields a fresh
/// identity.
async fn register_with_retry(server: &str, identity: &AgentIdentity) -> (ServerClient, String) {
    loop {
        match try_register(server, identity).await {
            Ok(pair) => return pair,
            Err(e) => {
                warn!(error = %e, "registration failed, retrying in 5s");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

async fn try_register(
    server: &str,
    identity: &AgentIdentity,
) -> Result<(ServerClient, String), crate::client::ClientError> {
    let mut client = ServerClient::connect(server).await?;
    let resp = client
        .register(RegisterRequest {
            hostname: identity.hostname.clone(),
            ip_address: identity.ip_address.clone(),
            mac_address: identity.mac_address.clone(),
            os_info: identity.os_info.clone(),
        })
        .await?;
    Ok((client, resp.agent_id))
}

fn spawn_telemetry_loop(client: ServerClient, agent_id: String, interval_secs: u64) {
    tokio::spawn(async move {
        let mut collector = SystemCollector::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let snapshot = collector.snapshot();
            let mut client = client.clone();
            if let Err(e) = client.push_telemetry(&agent_id, snapshot).await {
                warn!(error = %e, "telemetry push failed");
            }
        }
    });
}

/// Holds the command stream open and runs each delivered command in its
/// own task so a slow shell command never blocks the stream. A semaphore
/// caps how many commands run at once; a burst past the cap waits in
/// order of arrival. Reconnects after any stream failure; the server
/// replays still-pending commands on reattach.
fn spawn_stream_consumer(client: ServerClient, agent_id: String, reporter: Arc<Reporter>) {
    tokio::spawn(async move {
        let limiter = Arc::new(Semaphore::new(MAX_CONCURRENT_COMMANDS));
        loop {
            let mut stream_client = client.clone();
            match stream_client.open_command_stream(&agent_id).await {
                Ok(mut stream) => {
                    info!("command stream open");
                    loop {
                        match stream.message().await {
                            Ok(Some(cmd)) => {
                                let agent_id = agent_id.clone();
                                let reporter = reporter.clone();
                                let limiter = limiter.clone();
                                tokio::spawn(async move {
                                    let _permit = limiter
                                        .acquire_owned()
                                        .await
                                        .expect("command limiter closed");
                                    info!(
                                        command_id = %cmd.command_id,
                                        kind = cmd.kind,
                                        "command received"
                                    );
                                    let result = executor::execute(&agent_id, &cmd).await;
                                    reporter.report(result).await;
                                });
                            }
                            Ok(None) => {
                                warn!("command stream closed by server");
                                break;
                            }
                            Err(e) => {
                                error!(error = %e, "command stream error");
                                break;
                            }
                        }
                    }
                }
                Err(e) => warn!(error = %e, "could not open command stream"),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    });
}
