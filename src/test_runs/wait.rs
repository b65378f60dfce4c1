//! Optional blocking wait for run completion.
//!
//! Layers a bounded exponential backoff loop over the summary fetch. The
//! loop's deadline is independent of the per-call transport timeout, and
//! hitting it is not an error: the caller gets the last-known summary
//! with an explicit not-complete indicator and decides what to do.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::openl::BridgeError;

use super::poller::{ResultsPoller, RunSummary};

/// Backoff parameters for the wait loop.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    /// Delay before the second poll, in milliseconds.
    pub initial_delay_ms: u64,
    /// Cap for the exponentially growing delay.
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each poll.
    pub backoff_multiplier: f64,
    /// Maximum total time to wait before giving up.
    pub max_wait_secs: u64,
}

impl WaitPolicy {
    /// Delay before the poll after `attempt` completed polls:
    /// `initial * multiplier^(attempt-1)`, capped at `max_delay_ms`.
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        delay.min(self.max_delay_ms as f64) as u64
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            max_wait_secs: 120,
        }
    }
}

/// Result of a wait: the last summary seen and whether the run finished
/// within the deadline.
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    pub summary: RunSummary,
    pub complete: bool,
    pub attempts: u32,
    pub waited_ms: u64,
}

/// Poll the summary with backoff until the run completes or the policy's
/// deadline elapses. Remote failures propagate; a deadline does not.
pub async fn wait_for_completion(
    poller: &ResultsPoller,
    project_id: &str,
    policy: &WaitPolicy,
) -> Result<WaitOutcome, BridgeError> {
    let started = Instant::now();
    let deadline = Duration::from_secs(policy.max_wait_secs);
    let mut attempts = 0u32;

    loop {
        let summary = poller.summary(project_id, None).await?;
        attempts += 1;

        if summary.complete {
            debug!(
                "Test run for '{}' completed after {} poll(s)",
                project_id, attempts
            );
            return Ok(WaitOutcome {
                summary,
                complete: true,
                attempts,
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }

        let delay = Duration::from_millis(policy.delay_ms(attempts));
        if started.elapsed() + delay > deadline {
            debug!(
                "Wait for '{}' exceeded {}s after {} poll(s), returning last summary",
                project_id, policy.max_wait_secs, attempts
            );
            return Ok(WaitOutcome {
                summary,
                complete: false,
                attempts,
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }

        tokio::time::sleep(delay).await;
    }
}
