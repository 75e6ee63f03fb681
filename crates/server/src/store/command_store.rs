use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use fleetmon_common::proto::{Command, CommandKind, CommandResult};

use super::now_unix;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    UnknownAgent(String),
    UnknownCommand(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAgent(id) => write!(f, "unknown agent id: {id}"),
            Self::UnknownCommand(id) => write!(f, "command {id} is not pending for this agent"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Command lifecycle state. A command is pending (keyed by agent id and
/// command id) until its result is recorded, then lives only in the result
/// store. It is never in both places and never in neither once created.
#[derive(Clone)]
pub struct CommandStore {
    pending: Arc<DashMap<String, HashMap<String, Command>>>,
    results: Arc<DashMap<String, CommandResult>>,
}

impl CommandStore {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            results: Arc::new(DashMap::new()),
        }
    }

    /// Called at registration so every known agent owns a pending set.
    pub fn init_agent(&self, agent_id: &str) {
        self.pending.entry(agent_id.to_string()).or_default();
    }

    /// Creates a command in the agent's pending set. Enqueue only: delivery
    /// is the channel manager's concern.
    pub fn create(
        &self,
        agent_id: &str,
        kind: CommandKind,
        payload: String,
        timeout_seconds: i32,
    ) -> Result<Command, CommandError> {
        let mut entry = self
            .pending
            .get_mut(agent_id)
            .ok_or_else(|| CommandError::UnknownAgent(agent_id.to_string()))?;

        let command = Command {
            command_id: format!("cmd-{}", uuid::Uuid::new_v4()),
            kind: kind as i32,
            payload,
            timeout_seconds,
            issued_at_unix: now_unix(),
        };
        entry.insert(command.command_id.clone(), command.clone());

        Ok(command)
    }

    /// Snapshot of the agent's pending set, unordered. Empty for unknown
    /// agents.
    pub fn list_pending(&self, agent_id: &str) -> Vec<Command> {
        self.pending
            .get(agent_id)
            .map(|cmds| cmds.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn pending_count(&self, agent_id: &str) -> usize {
        self.pending.get(agent_id).map(|c| c.len()).unwrap_or(0)
    }

    /// Retires the pending entry and stores the result. Rejected when the
    /// command is not currently pending for this specific agent, so a client
    /// cannot report results for commands it was never issued; the result
    /// store is untouched on failure.
    pub fn record_result(&self, agent_id: &str, result: CommandResult) -> Result<(), CommandError> {
        let mut entry = self
            .pending
            .get_mut(agent_id)
            .ok_or_else(|| CommandError::UnknownAgent(agent_id.to_string()))?;

        if entry.remove(&result.command_id).is_none() {
            return Err(CommandError::UnknownCommand(result.command_id.clone()));
        }

        // The entry guard is still held, so readers of this agent's pending
        // set cannot observe the command as neither pending nor resulted.
        self.results.insert(result.command_id.clone(), result);
        Ok(())
    }

    /// A result that never arrives stays unobservable here: no expiry is
    /// synthesized for commands whose report was lost.
    pub fn result(&self, command_id: &str) -> Option<CommandResult> {
        self.results.get(command_id).map(|r| r.clone())
    }

    /// Drops the agent's entire pending set. Stored results are kept.
    pub fn remove_agent(&self, agent_id: &str) {
        self.pending.remove(agent_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(agent_id: &str, command_id: &str) -> CommandResult {
        CommandResult {
            agent_id: agent_id.into(),
            command_id: command_id.into(),
            success: true,
            output: "ok".into(),
            error: String::new(),
            execution_time_ms: 5,
            completed_at_unix: 1_700_000_000,
        }
    }

    #[test]
    fn create_for_unknown_agent_fails_without_mutation() {
        let store = CommandStore::new();
        let err = store
            .create("ghost", CommandKind::ShellExec, "ls".into(), 5)
            .unwrap_err();
        assert_eq!(err, CommandError::UnknownAgent("ghost".into()));
        assert_eq!(store.pending_count("ghost"), 0);
    }

    #[test]
    fn created_command_is_pending_until_resulted() {
        let store = CommandStore::new();
        store.init_agent("a1");

        let cmd = store
            .create("a1", CommandKind::ShellExec, "echo hi".into(), 5)
            .unwrap();
        assert_eq!(store.pending_count("a1"), 1);
        assert!(store.result(&cmd.command_id).is_none());

        store
            .record_result("a1", sample_result("a1", &cmd.command_id))
            .unwrap();
        assert_eq!(store.pending_count("a1"), 0);
        assert!(store.result(&cmd.command_id).is_some());
    }

    #[test]
    fn result_for_unissued_command_rejected() {
        let store = CommandStore::new();
        store.init_agent("a1");

        let err = store
            .record_result("a1", sample_result("a1", "cmd-bogus"))
            .unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("cmd-bogus".into()));
        assert!(store.result("cmd-bogus").is_none());
    }

    #[test]
    fn result_for_command_of_different_agent_rejected() {
        let store = CommandStore::new();
        store.init_agent("a1");
        store.init_agent("a2");

        let cmd = store
            .create("a1", CommandKind::InfoQuery, "cpu".into(), 5)
            .unwrap();

        let err = store
            .record_result("a2", sample_result("a2", &cmd.command_id))
            .unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand(cmd.command_id.clone()));

        // still pending for the rightful agent, result store unchanged
        assert_eq!(store.pending_count("a1"), 1);
        assert!(store.result(&cmd.command_id).is_none());
    }

    #[test]
    fn remove_agent_drops_pending_keeps_results() {
        let store = CommandStore::new();
        store.init_agent("a1");

        let done = store
            .create("a1", CommandKind::Update, "1.2".into(), 5)
            .unwrap();
        store
            .record_result("a1", sample_result("a1", &done.command_id))
            .unwrap();
        store
            .create("a1", CommandKind::ShellExec, "ls".into(), 5)
            .unwrap();

        store.remove_agent("a1");
        assert_eq!(store.pending_count("a1"), 0);
        assert!(store.result(&done.command_id).is_some());
    }

    #[test]
    fn command_ids_are_unique() {
        let store = CommandStore::new();
        store.init_agent("a1");
        let a = store
            .create("a1", CommandKind::ShellExec, "x".into(), 1)
            .unwrap();
        let b = store
            .create("a1", CommandKind::ShellExec, "x".into(), 1)
            .unwrap();
        assert_ne!(a.command_id, b.command_id);
    }
}
