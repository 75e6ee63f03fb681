use std::collections::HashMap;

use sysinfo::Networks;

use fleetmon_common::proto::{NetworkInterface, NetworkStats};

const EXCLUDED_PREFIXES: &[&str] = &["lo", "veth", "docker", "br-", "vmnet", "vbox", "virbr"];

fn is_excluded(name: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|p| name.starts_with(p))
}

pub(super) fn collect(networks: &Networks) -> NetworkStats {
    let mut interfaces = HashMap::new();
    let mut total_bytes_sent = 0i64;
    let mut total_bytes_received = 0i64;
    let mut total_packets_sent = 0i64;
    let mut total_packets_received = 0i64;

    for (name, data) in networks.iter() {
        // totals count every interface, the per-interface map hides
        // loopback and virtual devices
        total_bytes_sent += data.total_transmitted() as i64;
        total_bytes_received += data.total_received() as i64;
        total_packets_sent += data.total_packets_transmitted() as i64;
        total_packets_received += data.total_packets_received() as i64;

        if is_excluded(name) {
            continue;
        }
        let ip_address = data
            .ip_networks()
            .iter()
            .map(|ip| ip.addr.to_string())
            .next()
            .unwrap_or_default();
        interfaces.insert(
            name.clone(),
            NetworkInterface {
                name: name.clone(),
                ip_address,
                mac_address: data.mac_address().to_string(),
                bytes_sent: data.total_transmitted() as i64,
                bytes_received: data.total_received() as i64,
                is_up: !data.ip_networks().is_empty(),
            },
        );
    }

    NetworkStats {
        interfaces,
        total_bytes_sent,
        total_bytes_received,
        total_packets_sent,
        total_packets_received,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_and_virtual_names_are_excluded() {
        assert!(is_excluded("lo"));
        assert!(is_excluded("docker0"));
        assert!(is_excluded("veth1a2b"));
        assert!(is_excluded("br-f00d"));
        assert!(!is_excluded("eth0"));
        assert!(!is_excluded("enp3s0"));
    }
}
