//! Authorization timeout - bounded waits for verification round trips.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped wait exceeded its deadline and was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {}s", .after.as_secs())]
pub struct TimedOut {
    pub after: Duration,
}

/// Awaits `future`, cancelling it once `timeout` elapses.
///
/// `None` waits indefinitely.
pub async fn with_authorization_timeout<F>(
    timeout: Option<Duration>,
    future: F,
) -> Result<F::Output, TimedOut>
where
    F: Future,
{
    match timeout {
        None => Ok(future.await),
        Some(after) => tokio::time::timeout(after, future)
            .await
            .map_err(|_| TimedOut { after }),
    }
}
