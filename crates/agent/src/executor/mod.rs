mod info;
mod shell;
mod update;

use std::time::Instant;

use fleetmon_common::proto::{Command, CommandKind, CommandResult};

/// What a handler produced, before it is stamped with ids and timing.
pub(crate) struct Outcome {
    pub success: bool,
    pub output: String,
    pub error: String,
}

impl Outcome {
    pub(crate) fn ok(output: String) -> Self {
        Self {
            success: true,
            output,
            error: String::new(),
        }
    }

    pub(crate) fn fail(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error,
        }
    }
}

/// Runs one command to completion and wraps the outcome in a result
/// ready to report back.
pub async fn execute(agent_id: &str, cmd: &Command) -> CommandResult {
    let started = Instant::now();
    let outcome = match cmd.kind() {
        CommandKind::ShellExec => shell::run(&cmd.payload, cmd.timeout_seconds).await,
        CommandKind::InfoQuery => info::run(&cmd.payload),
        CommandKind::Update => update::run(&cmd.payload).await,
        CommandKind::Unspecified => Outcome::fail("unknown command kind".to_string()),
    };
    CommandResult {
        agent_id: agent_id.to_string(),
        command_id: cmd.command_id.clone(),
        success: outcome.success,
        output: outcome.output,
        error: outcome.error,
        execution_time_ms: started.elapsed().as_millis() as i64,
        completed_at_unix: std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(kind: CommandKind, payload: &str, timeout_seconds: i32) -> Command {
        Command {
            command_id: "cmd-test".to_string(),
            kind: kind as i32,
            payload: payload.to_string(),
            timeout_seconds,
            issued_at_unix: 0,
        }
    }

    #[tokio::test]
    async fn unspecified_kind_is_refused() {
        let result = execute("agent-1", &command(CommandKind::Unspecified, "", 0)).await;
        assert!(!result.success);
        assert_eq!(result.error, "unknown command kind");
        assert_eq!(result.command_id, "cmd-test");
        assert_eq!(result.agent_id, "agent-1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_command_captures_stdout() {
        let result = execute("agent-1", &command(CommandKind::ShellExec, "echo hi", 5)).await;
        assert!(result.success, "error: {}", result.error);
        assert_eq!(result.output.trim(), "hi");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_command_captures_stderr_on_failure() {
        let result = execute(
            "agent-1",
            &command(CommandKind::ShellExec, "echo oops >&2; exit 3", 5),
        )
        .await;
        assert!(!result.success);
        assert_eq!(result.error.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_command_times_out() {
        let result = execute("agent-1", &command(CommandKind::ShellExec, "sleep 30", 1)).await;
        assert!(!result.success);
        assert!(result.error.contains("timed out"), "error: {}", result.error);
        assert!(result.execution_time_ms < 5_000);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_timeout_means_no_deadline() {
        let result = execute("agent-1", &command(CommandKind::ShellExec, "echo ok", 0)).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn info_query_memory_reports_totals() {
        let result = execute("agent-1", &command(CommandKind::InfoQuery, "memory", 0)).await;
        assert!(result.success, "error: {}", result.error);
        assert!(result.output.contains("total"));
    }

    #[tokio::test]
    async fn info_query_unknown_topic_is_refused() {
        let result = execute("agent-1", &command(CommandKind::InfoQuery, "bogus", 0)).await;
        assert!(!result.success);
        assert!(result.error.contains("unknown info topic"));
    }

    #[tokio::test]
    async fn update_echoes_target_version() {
        let result = execute("agent-1", &command(CommandKind::Update, "2.1.0", 0)).await;
        assert!(result.success);
        assert!(result.output.contains("2.1.0"));
    }
}
