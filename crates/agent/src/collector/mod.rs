mod cpu;
mod disk;
mod identity;
mod memory;
mod network;

pub use identity::AgentIdentity;

use std::collections::HashMap;

use sysinfo::{Disks, Networks, System};

use fleetmon_common::proto::TelemetrySnapshot;

/// Samples the host once per call; refreshes the underlying sysinfo
/// handles in place so CPU usage deltas stay meaningful.
pub struct SystemCollector {
    sys: System,
    disks: Disks,
    networks: Networks,
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCollector {
    pub fn new() -> Self {
        Self {
            sys: System::new_all(),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
        }
    }

    pub fn snapshot(&mut self) -> TelemetrySnapshot {
        self.sys.refresh_all();
        self.disks.refresh(true);
        self.networks.refresh(true);

        let mut custom_metrics = HashMap::new();
        custom_metrics.insert("uptime_seconds".to_string(), System::uptime().to_string());
        custom_metrics.insert(
            "process_count".to_string(),
            self.sys.processes().len().to_string(),
        );

        TelemetrySnapshot {
            cpu: Some(cpu::collect(&self.sys)),
            memory: Some(memory::collect(&self.sys)),
            disk: Some(disk::collect(&self.disks)),
            network: Some(network::collect(&self.networks)),
            custom_metrics,
        }
    }
}
