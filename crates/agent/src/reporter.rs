use tracing::{debug, error};

use fleetmon_common::proto::CommandResult;
use fleetmon_common::retry::{retry_async, RetryConfig};

use crate::client::{ClientError, ServerClient};

/// Sends command results back to the server, retrying transient
/// failures. A result that still cannot be delivered after the policy
/// is exhausted is dropped with an error log.
pub struct Reporter {
    client: ServerClient,
    policy: RetryConfig,
}

impl Reporter {
    pub fn new(client: ServerClient, policy: RetryConfig) -> Self {
        Self { client, policy }
    }

    pub async fn report(&self, result: CommandResult) {
        let command_id = result.command_id.clone();
        let outcome = retry_async(&self.policy, || {
            let mut client = self.client.clone();
            let result = result.clone();
            async move {
                let ack = client.report_result(result).await?;
                if !ack.received {
                    return Err(ClientError::Rejected(ack.message));
                }
                Ok(())
            }
        })
        .await;

        match outcome {
            Ok(()) => debug!(command_id, "result delivered"),
            Err(e) => error!(command_id, error = %e, "dropping result after retries"),
        }
    }
}
