use sysinfo::Disks;

use fleetmon_common::proto::{DiskPartition, DiskStats};

pub(super) fn collect(disks: &Disks) -> DiskStats {
    let partitions = disks
        .iter()
        .map(|disk| {
            let total = disk.total_space();
            let free = disk.available_space();
            let used = total.saturating_sub(free);
            let usage_percent = if total > 0 {
                used as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            DiskPartition {
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                filesystem: disk.file_system().to_string_lossy().to_string(),
                total_bytes: total as i64,
                used_bytes: used as i64,
                free_bytes: free as i64,
                usage_percent,
            }
        })
        .collect();
    // sysinfo exposes per-disk byte counters, not op counts
    DiskStats {
        partitions,
        read_ops: 0,
        write_ops: 0,
    }
}
