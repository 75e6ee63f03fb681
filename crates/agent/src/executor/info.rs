use std::fmt::Write;

use sysinfo::{Disks, Networks, System};

use super::Outcome;

/// Answers an on-demand query about the host. The payload names the
/// topic; an empty payload means "all".
pub(super) fn run(payload: &str) -> Outcome {
    let topic = payload.trim().to_lowercase();
    let mut report = String::new();
    match topic.as_str() {
        "cpu" => write_cpu(&mut report),
        "memory" => write_memory(&mut report),
        "disk" => write_disk(&mut report),
        "network" => write_network(&mut report),
        "process" => write_process(&mut report),
        "all" | "" => {
            write_cpu(&mut report);
            write_memory(&mut report);
            write_disk(&mut report);
            write_network(&mut report);
            write_process(&mut report);
        }
        other => return Outcome::fail(format!("unknown info topic: {other}")),
    }
    Outcome::ok(report)
}

fn write_cpu(out: &mut String) {
    let mut sys = System::new();
    sys.refresh_cpu_all();
    let load = System::load_average();
    let _ = writeln!(out, "cpu:");
    let _ = writeln!(out, "  cores: {}", sys.cpus().len());
    let _ = writeln!(out, "  usage_percent: {:.1}", sys.global_cpu_usage());
    let _ = writeln!(
        out,
        "  load_avg: {:.2} {:.2} {:.2}",
        load.one, load.five, load.fifteen
    );
}

fn write_memory(out: &mut String) {
    let mut sys = System::new();
    sys.refresh_memory();
    let _ = writeln!(out, "memory:");
    let _ = writeln!(out, "  total_bytes: {}", sys.total_memory());
    let _ = writeln!(out, "  used_bytes: {}", sys.used_memory());
    let _ = writeln!(out, "  available_bytes: {}", sys.available_memory());
    let _ = writeln!(out, "  swap_total_bytes: {}", sys.total_swap());
    let _ = writeln!(out, "  swap_used_bytes: {}", sys.used_swap());
}

fn write_disk(out: &mut String) {
    let disks = Disks::new_with_refreshed_list();
    let _ = writeln!(out, "disk:");
    for disk in disks.iter() {
        let _ = writeln!(
            out,
            "  {}: total_bytes={} available_bytes={}",
            disk.mount_point().to_string_lossy(),
            disk.total_space(),
            disk.available_space()
        );
    }
}

fn write_network(out: &mut String) {
    let networks = Networks::new_with_refreshed_list();
    let _ = writeln!(out, "network:");
    for (name, data) in networks.iter() {
        let _ = writeln!(
            out,
            "  {}: bytes_received={} bytes_sent={}",
            name,
            data.total_received(),
            data.total_transmitted()
        );
    }
}

fn write_process(out: &mut String) {
    let mut sys = System::new();
    sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);
    let _ = writeln!(out, "process:");
    let _ = writeln!(out, "  count: {}", sys.processes().len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_topic_reports_everything() {
        let outcome = run("");
        assert!(outcome.success);
        for section in ["cpu:", "memory:", "disk:", "network:", "process:"] {
            assert!(outcome.output.contains(section), "missing {section}");
        }
    }

    #[test]
    fn topic_is_case_insensitive() {
        let outcome = run("MEMORY");
        assert!(outcome.success);
        assert!(outcome.output.starts_with("memory:"));
    }
}
