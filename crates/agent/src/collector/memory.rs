use sysinfo::System;

use fleetmon_common::proto::MemoryStats;

pub(super) fn collect(sys: &System) -> MemoryStats {
    let total = sys.total_memory();
    let used = sys.used_memory();
    let usage_percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let swap_total = sys.total_swap();
    let swap_used = sys.used_swap();
    MemoryStats {
        total_bytes: total as i64,
        used_bytes: used as i64,
        free_bytes: sys.available_memory() as i64,
        usage_percent,
        swap_total_bytes: swap_total as i64,
        swap_used_bytes: swap_used as i64,
        swap_free_bytes: swap_total.saturating_sub(swap_used) as i64,
    }
}
