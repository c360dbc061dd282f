//! Timeout enforcement for external calls.

use std::future::IntoFuture;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {0:?}")]
pub struct TimedOut(pub Duration);

/// Run `fut` with a deadline; the future is dropped when it expires.
pub async fn with_timeout<F: IntoFuture>(duration: Duration, fut: F) -> Result<F::Output, TimedOut> {
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| TimedOut(duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{ready, Ready};

    /// A request builder that only becomes a future when awaited.
    struct PendingRequest(u64);

    impl IntoFuture for PendingRequest {
        type Output = u64;
        type IntoFuture = Ready<u64>;

        fn into_future(self) -> Self::IntoFuture {
            ready(self.0)
        }
    }

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_timeout(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_times_out() {
        let result = with_timeout(
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;
        assert_eq!(result, Err(TimedOut(Duration::from_millis(10))));
    }

    #[tokio::test]
    async fn test_accepts_into_future_builders() {
        let result = with_timeout(Duration::from_secs(1), PendingRequest(21_000)).await;
        assert_eq!(result, Ok(21_000));
    }
}
