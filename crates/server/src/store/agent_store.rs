use std::sync::Arc;

use dashmap::DashMap;
use fleetmon_common::proto::TelemetrySnapshot;

use super::agent_record::AgentRecord;
use super::now_ms;

/// In-memory agent registry. Ids are assigned at registration and never
/// reused for the lifetime of the store.
#[derive(Clone)]
pub struct AgentStore {
    agents: Arc<DashMap<String, AgentRecord>>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self {
            agents: Arc::new(DashMap::new()),
        }
    }

    /// Registration always succeeds: two hosts with the same hostname or IP
    /// get distinct records.
    pub fn register(
        &self,
        hostname: String,
        ip_address: String,
        mac_address: String,
        os_info: String,
    ) -> String {
        let agent_id = format!("agent-{}", uuid::Uuid::new_v4());
        let now = now_ms();

        self.agents.insert(
            agent_id.clone(),
            AgentRecord {
                agent_id: agent_id.clone(),
                hostname,
                ip_address,
                mac_address,
                os_info,
                registered_at_ms: now,
                last_seen_ms: now,
                snapshot: None,
            },
        );

        agent_id
    }

    pub fn get(&self, agent_id: &str) -> Option<AgentRecord> {
        self.agents.get(agent_id).map(|r| r.clone())
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.agents.contains_key(agent_id)
    }

    pub fn list(&self) -> Vec<AgentRecord> {
        self.agents.iter().map(|r| r.value().clone()).collect()
    }

    /// Replaces the record's snapshot and refreshes last-seen. Returns false
    /// when the agent id is unknown.
    pub fn update_telemetry(&self, agent_id: &str, snapshot: TelemetrySnapshot) -> bool {
        match self.agents.get_mut(agent_id) {
            Some(mut record) => {
                record.snapshot = Some(snapshot);
                record.last_seen_ms = now_ms();
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, agent_id: &str) -> bool {
        self.agents.remove(agent_id).is_some()
    }

    pub fn count(&self) -> usize {
        self.agents.len()
    }
}
