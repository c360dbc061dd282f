//! Retry policies for polling external services.
//!
//! # Responsibilities
//! - Repeat an attempt until it yields a value, with a fixed delay in between
//! - Treat attempt errors as transient: log, count and retry
//! - Stop on exhaustion (bounded mode) or caller cancellation
//!
//! # Design Decisions
//! - Fixed delay, never a hot loop against the remote side
//! - Cancellation is checked while sleeping and while an attempt is in flight
//! - Dropping the returned future abandons the loop as well

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// How many attempts a policy allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryMode {
    Bounded { max_attempts: u32 },
    /// Runs until success or cancellation.
    Unbounded,
}

/// Why a retry loop ended without a value.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("retry loop cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32, last_error: Option<E> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub mode: RetryMode,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn bounded(max_attempts: u32, delay: Duration) -> Self {
        Self {
            mode: RetryMode::Bounded { max_attempts },
            delay,
        }
    }

    pub fn unbounded(delay: Duration) -> Self {
        Self {
            mode: RetryMode::Unbounded,
            delay,
        }
    }

    /// Whether another attempt may follow `attempts` completed ones.
    fn allows_another(&self, attempts: u32) -> bool {
        match self.mode {
            RetryMode::Bounded { max_attempts } => attempts < max_attempts,
            RetryMode::Unbounded => true,
        }
    }

    /// Call `attempt` until it returns `Ok(Some(value))`.
    ///
    /// `Ok(None)` means "not ready yet"; `Err` is a transient failure. Both
    /// wait `delay` before the next attempt. `operation` labels log lines.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &'static str,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let mut attempts = 0u32;
        let mut last_error = None;

        // Unbounded waits can outlive u32; the counter only feeds logs.
        while self.allows_another(attempts) {
            attempts = attempts.saturating_add(1);

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
                outcome = attempt(attempts) => outcome,
            };
            match outcome {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {
                    tracing::trace!(operation, attempt = attempts, "Not ready, retrying");
                }
                Err(e) => {
                    tracing::warn!(operation, attempt = attempts, error = %e, "Transient failure, retrying");
                    last_error = Some(e);
                }
            }

            if !self.allows_another(attempts) {
                break;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        Err(RetryError::Exhausted {
            attempts,
            last_error,
        })
    }
}
