use std::time::Duration;

use tokio::process::Command as ProcessCommand;

use super::Outcome;

/// Runs the payload through the platform shell. A non-positive timeout
/// means the command may run indefinitely.
pub(super) async fn run(payload: &str, timeout_seconds: i32) -> Outcome {
    if payload.trim().is_empty() {
        return Outcome::fail("empty shell command".to_string());
    }

    let mut cmd = if cfg!(windows) {
        let mut c = ProcessCommand::new("cmd");
        c.args(["/C", payload]);
        c
    } else {
        let mut c = ProcessCommand::new("sh");
        c.args(["-c", payload]);
        c
    };
    cmd.kill_on_drop(true);

    let output = if timeout_seconds > 0 {
        let deadline = Duration::from_secs(timeout_seconds as u64);
        match tokio::time::timeout(deadline, cmd.output()).await {
            Ok(result) => result,
            Err(_) => {
                return Outcome::fail(format!("timed out after {timeout_seconds}s"));
            }
        }
    } else {
        cmd.output().await
    };

    match output {
        Ok(out) => {
            let stdout = String::from_utf8_lossy(&out.stdout).to_string();
            let stderr = String::from_utf8_lossy(&out.stderr).to_string();
            if out.status.success() {
                Outcome {
                    success: true,
                    output: stdout,
                    error: stderr,
                }
            } else {
                let error = if stderr.is_empty() {
                    format!("exited with {}", out.status)
                } else {
                    stderr
                };
                Outcome {
                    success: false,
                    output: stdout,
                    error,
                }
            }
        }
        Err(e) => Outcome::fail(format!("failed to spawn shell: {e}")),
    }
}
