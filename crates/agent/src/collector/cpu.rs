use sysinfo::System;

use fleetmon_common::proto::CpuStats;

pub(super) fn collect(sys: &System) -> CpuStats {
    let per_core_usage: Vec<f64> = sys.cpus().iter().map(|c| c.cpu_usage() as f64).collect();
    let core_count = per_core_usage.len() as i32;
    let load = System::load_average();
    CpuStats {
        usage_percent: sys.global_cpu_usage() as f64,
        core_count,
        per_core_usage,
        load_avg_1m: (load.one * 100.0) as i64,
        load_avg_5m: (load.five * 100.0) as i64,
        load_avg_15m: (load.fifteen * 100.0) as i64,
    }
}
