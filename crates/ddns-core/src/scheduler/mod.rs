//! Fixed-interval retry loop
//!
//! The scheduler drives a [`Retryable`] forever. It is a two-state machine
//! with no terminal state:
//!
//! ```text
//!            Ok(())                         Err(e)
//!   ┌──────────────────────┐      ┌───────────────────────┐
//!   ▼                      │      │                       ▼
//! WaitingAfterSuccess ── attempt() ── WaitingAfterFailure
//!  (wait_interval)                     (retry_interval)
//! ```
//!
//! Every error is treated the same way: logged, then retried after the
//! failure interval. There is no backoff growth, no jitter and no retry
//! cap. Sleeping goes through a [`Sleeper`] so the loop can be driven in
//! tests without real waits.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::Result;

/// A unit of work the scheduler can run repeatedly
#[async_trait]
pub trait Retryable: Send + Sync {
    /// Run the work once
    async fn attempt(&self) -> Result<()>;
}

#[async_trait]
impl<T: Retryable + ?Sized> Retryable for Arc<T> {
    async fn attempt(&self) -> Result<()> {
        (**self).attempt().await
    }
}

/// Capability to wait for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// State the scheduler is in after an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Last attempt succeeded
    WaitingAfterSuccess,
    /// Last attempt failed
    WaitingAfterFailure,
}

/// Runs a [`Retryable`] forever at fixed intervals
pub struct Scheduler<R, S = TokioSleeper> {
    retryable: R,
    sleeper: S,
    wait_interval: Duration,
    retry_interval: Duration,
}

impl<R: Retryable> Scheduler<R, TokioSleeper> {
    /// Create a scheduler that sleeps on the tokio timer
    ///
    /// # Parameters
    ///
    /// - `retryable`: The work to run
    /// - `wait_interval`: Sleep after a successful attempt
    /// - `retry_interval`: Sleep after a failed attempt
    pub fn new(retryable: R, wait_interval: Duration, retry_interval: Duration) -> Self {
        Self::with_sleeper(retryable, TokioSleeper, wait_interval, retry_interval)
    }
}

impl<R: Retryable, S: Sleeper> Scheduler<R, S> {
    /// Create a scheduler with a custom sleeper
    pub fn with_sleeper(
        retryable: R,
        sleeper: S,
        wait_interval: Duration,
        retry_interval: Duration,
    ) -> Self {
        Self {
            retryable,
            sleeper,
            wait_interval,
            retry_interval,
        }
    }

    /// How long to wait in `state`
    pub fn interval_for(&self, state: SchedulerState) -> Duration {
        match state {
            SchedulerState::WaitingAfterSuccess => self.wait_interval,
            SchedulerState::WaitingAfterFailure => self.retry_interval,
        }
    }

    /// Run one attempt and return the state to wait in
    ///
    /// The attempt's error is logged here and never propagated.
    pub async fn step(&self) -> SchedulerState {
        match self.retryable.attempt().await {
            Ok(()) => {
                info!("Success. Next attempt in {:?}", self.wait_interval);
                SchedulerState::WaitingAfterSuccess
            }
            Err(e) => {
                error!(
                    "An error occurred: {}. Retrying in {:?}",
                    e, self.retry_interval
                );
                SchedulerState::WaitingAfterFailure
            }
        }
    }

    /// Run forever
    ///
    /// Never returns; stop the surrounding task to end the loop.
    pub async fn run(&self) -> Infallible {
        loop {
            let state = self.step().await;
            self.sleeper.sleep(self.interval_for(state)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Retryable for Flaky {
        async fn attempt(&self) -> Result<()> {
            // First call fails, then alternates
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(Error::transport("connection refused"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_step_transitions() {
        let scheduler = Scheduler::new(
            Flaky {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(60),
            Duration::from_secs(5),
        );

        assert_eq!(scheduler.step().await, SchedulerState::WaitingAfterFailure);
        assert_eq!(scheduler.step().await, SchedulerState::WaitingAfterSuccess);
        assert_eq!(scheduler.step().await, SchedulerState::WaitingAfterFailure);
    }

    #[test]
    fn test_interval_for_state() {
        let scheduler = Scheduler::new(
            Flaky {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(60),
            Duration::from_secs(5),
        );

        assert_eq!(
            scheduler.interval_for(SchedulerState::WaitingAfterSuccess),
            Duration::from_secs(60)
        );
        assert_eq!(
            scheduler.interval_for(SchedulerState::WaitingAfterFailure),
            Duration::from_secs(5)
        );
    }
}
