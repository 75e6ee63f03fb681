use std::future::Future;
use std::time::Duration;

/// Retry policy for fallible operations. `backoff_factor` of 1.0 gives
/// fixed-interval retries; larger values grow the delay between attempts.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// Fixed-interval policy: `max_attempts` tries, `delay` between each.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            backoff_factor: 1.0,
        }
    }
}

pub async fn retry_async<F, Fut, T, E>(config: &RetryConfig, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    let mut delay = config.initial_delay;
    let mut last_err = None;

    for attempt in 1..=config.max_attempts {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    error = ?e,
                    "attempt failed"
                );
                last_err = Some(e);
                if attempt < config.max_attempts {
                    tokio::time::sleep(delay).await;
                    delay = Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_factor);
                }
            }
        }
    }

    Err(last_err.expect("at least one attempt runs"))
}
