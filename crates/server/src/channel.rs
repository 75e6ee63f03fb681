use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fleetmon_common::proto::Command;
use tokio::sync::mpsc;
use tonic::Status;

pub type CommandSender = mpsc::UnboundedSender<Result<Command, Status>>;

/// Tracks at most one live push channel per connected agent.
///
/// The table lock also serializes command creation against replay snapshots
/// (`deliver` vs `attach`), so a command created concurrently with a
/// reconnect is delivered exactly once. Handles are unbounded senders and
/// every send inside the lock is non-blocking: a slow or wedged agent
/// connection cannot stall other server state mutations.
#[derive(Clone)]
pub struct ChannelManager {
    table: Arc<Mutex<HashMap<String, CommandSender>>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers `tx` for the agent and replays the pending snapshot in one
    /// burst. A handle already registered for the same id is replaced
    /// without being closed (last writer wins). Returns the replay count.
    pub fn attach(
        &self,
        agent_id: &str,
        tx: CommandSender,
        pending: impl FnOnce() -> Vec<Command>,
    ) -> usize {
        let mut table = self.table.lock().expect("stream table lock poisoned");

        if table.insert(agent_id.to_string(), tx.clone()).is_some() {
            tracing::warn!(agent_id = %agent_id, "replacing live command stream");
        }

        let snapshot = pending();
        let mut sent = 0;
        for command in snapshot {
            let command_id = command.command_id.clone();
            if tx.send(Ok(command)).is_ok() {
                sent += 1;
            } else {
                tracing::warn!(
                    agent_id = %agent_id,
                    command_id = %command_id,
                    "replay push failed, command stays pending"
                );
            }
        }
        sent
    }

    /// Runs `create` under the table lock and attempts one immediate push of
    /// the new command. Push failure is non-fatal: the command remains
    /// pending and is delivered by the next replay.
    pub fn deliver<E>(
        &self,
        agent_id: &str,
        create: impl FnOnce() -> Result<Command, E>,
    ) -> Result<Command, E> {
        let table = self.table.lock().expect("stream table lock poisoned");

        let command = create()?;
        if let Some(tx) = table.get(agent_id) {
            if tx.send(Ok(command.clone())).is_err() {
                tracing::warn!(
                    agent_id = %agent_id,
                    command_id = %command.command_id,
                    "live push failed, command stays pending"
                );
            }
        }
        Ok(command)
    }

    /// Deregisters the handle only while `tx` is still the live one; a
    /// handle displaced by a newer connection must not tear that one down.
    pub fn detach_if_current(&self, agent_id: &str, tx: &CommandSender) {
        let mut table = self.table.lock().expect("stream table lock poisoned");
        let is_current = table
            .get(agent_id)
            .map(|current| current.same_channel(tx))
            .unwrap_or(false);
        if is_current {
            table.remove(agent_id);
        }
    }

    /// Unconditional removal, used by agent removal.
    pub fn remove(&self, agent_id: &str) {
        self.table
            .lock()
            .expect("stream table lock poisoned")
            .remove(agent_id);
    }

    pub fn is_connected(&self, agent_id: &str) -> bool {
        self.table
            .lock()
            .expect("stream table lock poisoned")
            .contains_key(agent_id)
    }
}
