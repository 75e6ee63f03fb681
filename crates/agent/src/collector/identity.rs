use sysinfo::{Networks, System};

/// Host identity sent once at registration.
#[derive(Debug, Clone)]
pub struct AgentIdentity {
    pub hostname: String,
    pub ip_address: String,
    pub mac_address: String,
    pub os_info: String,
}

impl AgentIdentity {
    pub fn discover() -> Self {
        let hostname = System::host_name().unwrap_or_else(|| "unknown".to_string());
        let os_info = format!(
            "{} {}",
            System::name().unwrap_or_else(|| "unknown".to_string()),
            System::os_version().unwrap_or_default()
        )
        .trim()
        .to_string();

        let networks = Networks::new_with_refreshed_list();
        let mut ip_address = String::new();
        let mut mac_address = String::new();
        for (name, data) in networks.iter() {
            if name.starts_with("lo") {
                continue;
            }
            let Some(ip) = data
                .ip_networks()
                .iter()
                .find(|ip| ip.addr.is_ipv4() && !ip.addr.is_loopback())
            else {
                continue;
            };
            ip_address = ip.addr.to_string();
            mac_address = data.mac_address().to_string();
            break;
        }

        Self {
            hostname,
            ip_address,
            mac_address,
            os_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_fills_hostname_and_os() {
        let identity = AgentIdentity::discover();
        assert!(!identity.hostname.is_empty());
        assert!(!identity.os_info.is_empty());
    }
}
