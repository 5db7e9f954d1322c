//! Retry policy — an explicit (max attempts, backoff) value applied around
//! a single attempt operation, so the control flow is testable with an
//! injected attempt function instead of being buried in the client.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How many times to run an attempt and how long to sleep between failures.
/// `max_attempts` is the total attempt count (minimum 1), not the number of
/// re-tries after the first failure.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: fn(u32) -> Duration,
}

/// Quadratic backoff: attempt² seconds (1s, 4s, 9s, …). Deliberately more
/// aggressive than exponential for the small attempt counts used here.
pub fn quadratic_backoff(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt) * u64::from(attempt))
}

/// Terminal outcome of an exhausted policy: the attempt count and the last
/// underlying failure.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: fn(u32) -> Duration) -> Self {
        RetryPolicy {
            max_attempts,
            backoff,
        }
    }

    /// Runs `op` (passed the 1-based attempt number) until it succeeds or
    /// the attempt budget is spent. The backoff sleeps are await points, so
    /// a deadline wrapped around this future cancels them too.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= self.max_attempts => {
                    return Err(RetryExhausted { attempts: attempt, last });
                }
                Err(err) => {
                    let delay = (self.backoff)(attempt);
                    warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %err,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
