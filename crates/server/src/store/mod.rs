mod agent_record;
mod agent_store;
mod command_store;

pub use agent_record::AgentRecord;
pub use agent_store::AgentStore;
pub use command_store::{CommandError, CommandStore};

pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

pub(crate) fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
