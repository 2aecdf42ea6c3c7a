//! Poll a submitted job until it finishes, fails or runs out of time

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::provider::Provider;
use crate::types::{JobHandle, JobStatus, ReadyFile};

/// Wall-clock budget for one job
pub const POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Pause between status checks in chat
pub const CHAT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Pause between status checks from the web page
pub const WEB_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub const fn chat() -> Self {
        Self {
            interval: CHAT_POLL_INTERVAL,
            timeout: POLL_TIMEOUT,
        }
    }

    pub const fn web() -> Self {
        Self {
            interval: WEB_POLL_INTERVAL,
            timeout: POLL_TIMEOUT,
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::chat()
    }
}

/// How a polling run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Ready(ReadyFile),
    /// The provider (or the transport) reported an error
    Failed(String),
    TimedOut,
    Cancelled,
}

/// Query `handle` every `settings.interval` until it leaves `Pending`.
///
/// The deadline is checked before each query, so with the default settings
/// queries run at 0, 10, ... 60 seconds and the timeout is declared on the
/// next turn. An error from the provider ends the run as `Failed`; nothing is
/// retried.
pub async fn poll_until_ready<P>(
    provider: &P,
    handle: &JobHandle,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> PollOutcome
where
    P: Provider,
{
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        if started.elapsed() > settings.timeout {
            tracing::info!(
                "Job {}/{} timed out after {} checks",
                handle.provider_slug,
                handle.item_id,
                attempts
            );
            return PollOutcome::TimedOut;
        }

        attempts += 1;
        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            status = provider.check_status(handle) => status,
        };

        match status {
            Ok(JobStatus::Ready(file)) => {
                tracing::info!("Job {}/{} ready: {}", handle.provider_slug, handle.item_id, file.filename);
                return PollOutcome::Ready(file);
            }
            Ok(JobStatus::Failed(message)) => return PollOutcome::Failed(message),
            Err(err) => {
                tracing::warn!("Status check for {}/{} failed: {}", handle.provider_slug, handle.item_id, err);
                return PollOutcome::Failed(err.to_string());
            }
            Ok(JobStatus::Pending) => {
                tracing::debug!("Job {}/{} still pending (check {})", handle.provider_slug, handle.item_id, attempts);
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}
