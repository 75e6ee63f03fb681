use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CollectConfig {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReportConfig {
    #[serde(default = "default_report_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_report_delay")]
    pub retry_delay_seconds: u64,
}

fn default_server() -> String {
    "http://localhost:50051".into()
}

fn default_interval() -> u64 {
    60
}

fn default_report_attempts() -> u32 {
    3
}

fn default_report_delay() -> u64 {
    2
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            collect: CollectConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_report_attempts(),
            retry_delay_seconds: default_report_delay(),
        }
    }
}
