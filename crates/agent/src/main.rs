use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleetmon_agent::cli::Opts;
use fleetmon_agent::config::{self, AgentConfig};
use fleetmon_agent::run;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opts = Opts::parse();

    let mut config = match opts.config {
        Some(ref path) => match config::load_from_file(std::path::Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "failed to load config");
                std::process::exit(1);
            }
        },
        None => AgentConfig::default(),
    };

    if let Some(server) = opts.server {
        config.server = server;
    }
    if let Some(interval) = opts.interval {
        config.collect.interval_seconds = interval;
    }

    if let Err(e) = run::run(config).await {
        tracing::error!(error = %e, "agent exited with error");
        std::process::exit(1);
    }
}
