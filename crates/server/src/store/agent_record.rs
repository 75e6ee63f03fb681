use fleetmon_common::proto::TelemetrySnapshot;

#[derive(Debug, Clone)]
pub struct AgentRecord {
    pub agent_id: String,
    pub hostname: String,
    pub ip_address: String,
    pub mac_address: String,
    pub os_info: String,
    pub registered_at_ms: i64,
    pub last_seen_ms: i64,
    /// Latest telemetry snapshot; `None` until the agent's first push.
    pub snapshot: Option<TelemetrySnapshot>,
}
