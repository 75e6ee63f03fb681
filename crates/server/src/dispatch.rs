use fleetmon_common::proto::{Command, CommandKind, CommandResult, TelemetrySnapshot};

use crate::channel::{ChannelManager, CommandSender};
use crate::store::{AgentRecord, AgentStore, CommandError, CommandStore};

#[derive(Debug, PartialEq, Eq)]
pub enum DispatchError {
    UnknownAgent(String),
    UnknownCommand(String),
    UnknownResult(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAgent(id) => write!(f, "unknown agent id: {id}"),
            Self::UnknownCommand(id) => write!(f, "command {id} was not issued to this agent"),
            Self::UnknownResult(id) => write!(f, "no result recorded for command {id}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<CommandError> for DispatchError {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::UnknownAgent(id) => Self::UnknownAgent(id),
            CommandError::UnknownCommand(id) => Self::UnknownCommand(id),
        }
    }
}

/// Composes the registry, the command lifecycle store, and the streaming
/// channel table behind one set of operations. Both the gRPC surface and
/// the management API go through this service.
#[derive(Clone)]
pub struct Dispatch {
    agents: AgentStore,
    commands: CommandStore,
    channels: ChannelManager,
}

impl Dispatch {
    pub fn new() -> Self {
        Self {
            agents: AgentStore::new(),
            commands: CommandStore::new(),
            channels: ChannelManager::new(),
        }
    }

    pub fn register_agent(
        &self,
        hostname: String,
        ip_address: String,
        mac_address: String,
        os_info: String,
    ) -> String {
        let agent_id = self.agents.register(hostname, ip_address, mac_address, os_info);
        self.commands.init_agent(&agent_id);
        agent_id
    }

    pub fn update_telemetry(
        &self,
        agent_id: &str,
        snapshot: TelemetrySnapshot,
    ) -> Result<(), DispatchError> {
        if self.agents.update_telemetry(agent_id, snapshot) {
            Ok(())
        } else {
            Err(DispatchError::UnknownAgent(agent_id.to_string()))
        }
    }

    /// Creates a command and fires one push attempt at the agent's live
    /// stream, if any. Returns as soon as the command is enqueued; delivery
    /// is not awaited.
    pub fn dispatch_command(
        &self,
        agent_id: &str,
        kind: CommandKind,
        payload: String,
        timeout_seconds: i32,
    ) -> Result<Command, DispatchError> {
        if !self.agents.contains(agent_id) {
            return Err(DispatchError::UnknownAgent(agent_id.to_string()));
        }

        let command = self.channels.deliver(agent_id, || {
            self.commands.create(agent_id, kind, payload, timeout_seconds)
        })?;

        tracing::info!(
            agent_id = %agent_id,
            command_id = %command.command_id,
            kind = command.kind,
            "command created"
        );
        Ok(command)
    }

    /// Registers a stream handle and replays every currently pending
    /// command in one burst. Returns the replay count.
    pub fn attach_stream(
        &self,
        agent_id: &str,
        tx: CommandSender,
    ) -> Result<usize, DispatchError> {
        if !self.agents.contains(agent_id) {
            return Err(DispatchError::UnknownAgent(agent_id.to_string()));
        }
        Ok(self
            .channels
            .attach(agent_id, tx, || self.commands.list_pending(agent_id)))
    }

    pub fn detach_stream(&self, agent_id: &str, tx: &CommandSender) {
        self.channels.detach_if_current(agent_id, tx);
    }

    pub fn report_result(&self, result: CommandResult) -> Result<(), DispatchError> {
        if !self.agents.contains(&result.agent_id) {
            return Err(DispatchError::UnknownAgent(result.agent_id));
        }
        let agent_id = result.agent_id.clone();
        self.commands.record_result(&agent_id, result)?;
        Ok(())
    }

    /// Deletes the record, its pending commands, and its stream handle
    /// together. Stored results survive.
    pub fn remove_agent(&self, agent_id: &str) -> Result<(), DispatchError> {
        if !self.agents.remove(agent_id) {
            return Err(DispatchError::UnknownAgent(agent_id.to_string()));
        }
        self.channels.remove(agent_id);
        self.commands.remove_agent(agent_id);
        tracing::info!(agent_id = %agent_id, "agent removed");
        Ok(())
    }

    pub fn get_agent(&self, agent_id: &str) -> Option<AgentRecord> {
        self.agents.get(agent_id)
    }

    pub fn list_agents(&self) -> Vec<AgentRecord> {
        self.agents.list()
    }

    pub fn agent_exists(&self, agent_id: &str) -> bool {
        self.agents.contains(agent_id)
    }

    pub fn list_pending(&self, agent_id: &str) -> Vec<Command> {
        self.commands.list_pending(agent_id)
    }

    pub fn pending_count(&self, agent_id: &str) -> usize {
        self.commands.pending_count(agent_id)
    }

    pub fn get_result(&self, command_id: &str) -> Result<CommandResult, DispatchError> {
        self.commands
            .result(command_id)
            .ok_or_else(|| DispatchError::UnknownResult(command_id.to_string()))
    }

    pub fn stream_connected(&self, agent_id: &str) -> bool {
        self.channels.is_connected(agent_id)
    }
}
