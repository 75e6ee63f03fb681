use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "fleetmon-agent", version, about = "Fleetmon host agent")]
pub struct Opts {
    #[arg(long, help = "Path to agent config file")]
    pub config: Option<String>,

    #[arg(long, help = "Server endpoint (overrides config)")]
    pub server: Option<String>,

    #[arg(long, help = "Telemetry interval in seconds (overrides config)")]
    pub interval: Option<u64>,
}
