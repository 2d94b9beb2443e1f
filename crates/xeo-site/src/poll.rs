//! Bounded polling for asynchronously rendered anchors.
//!
//! Rendering happens outside the core, so anchors for freshly resolved
//! headings appear some time after resolution. Pollers check once
//! immediately, then once per interval up to a fixed budget. A renderer that
//! can announce "content mounted" passes a [`Notify`] to wake the poller
//! early; the interval stays as the fallback.

use std::time::Duration;

use tokio::sync::Notify;

/// Interval and retry budget for a poll loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between checks.
    pub interval: Duration,
    /// Checks after the immediate one.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_attempts: 20,
        }
    }
}

impl PollPolicy {
    /// Upper bound on how long a poll loop can run.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Suspend until the next check is due.
///
/// Returns early when `mounted` is notified.
pub async fn tick(policy: PollPolicy, mounted: Option<&Notify>) {
    match mounted {
        Some(signal) => {
            tokio::select! {
                () = tokio::time::sleep(policy.interval) => {}
                () = signal.notified() => {}
            }
        }
        None => tokio::time::sleep(policy.interval).await,
    }
}

/// Run `check` until it succeeds or the retry budget is spent.
///
/// Returns whether `check` ever succeeded. Dropping the future cancels the
/// loop.
pub async fn poll_until<F>(policy: PollPolicy, mounted: Option<&Notify>, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    if check() {
        return true;
    }

    for attempt in 1..=policy.max_attempts {
        tick(policy, mounted).await;
        if check() {
            tracing::debug!(attempt, "Poll succeeded");
            return true;
        }
    }

    tracing::debug!(attempts = policy.max_attempts, "Poll budget exhausted");
    false
}
