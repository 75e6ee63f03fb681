use std::time::Duration;

use tracing::info;

use super::Outcome;

/// Placeholder self-update: acknowledges the requested version without
/// touching the running binary.
pub(super) async fn run(payload: &str) -> Outcome {
    let version = payload.trim();
    info!(version, "update requested");
    tokio::time::sleep(Duration::from_secs(2)).await;
    Outcome::ok(format!("update simulated\nversion: {version}"))
}
