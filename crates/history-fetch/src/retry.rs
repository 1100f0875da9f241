//! Rate-limit aware retries
//!
//! [`RateLimitedRetrier`] wraps a single remote call. When the call reports a
//! rate limit it sleeps `attempt × base_delay` and tries again; any other
//! error is returned immediately. Backoff state lives inside one `execute`
//! call, so concurrent or nested calls never share a counter.

use std::fmt;
use std::time::Duration;

/// Errors that can signal a rate limit
pub trait Throttled {
    fn is_rate_limited(&self) -> bool;
}

/// Linear backoff policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Backoff unit; attempt `n` is followed by a wait of `n × base_delay`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(5);

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
    }
}

/// Sleep capability, injectable for tests
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Outcome of a call that did not succeed
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("Retries exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("{0}")]
    Operation(E),
}

/// Retries a call while it reports a rate limit
#[derive(Debug, Clone)]
pub struct RateLimitedRetrier<S = ThreadSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl RateLimitedRetrier<ThreadSleeper> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, ThreadSleeper)
    }
}

impl<S: Sleeper> RateLimitedRetrier<S> {
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    /// Runs `call` until it succeeds, fails with a non-rate-limit error, or
    /// `max_attempts` calls have been rate limited.
    pub fn execute<T, E, F>(&self, operation: &str, mut call: F) -> Result<T, RetryError<E>>
    where
        E: Throttled + fmt::Display,
        F: FnMut() -> Result<T, E>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match call() {
                Ok(value) => return Ok(value),
                Err(error) if error.is_rate_limited() => {
                    if attempt >= max_attempts {
                        log::warn!(
                            "{}: still rate limited after {} attempts, giving up",
                            operation,
                            attempt
                        );
                        return Err(RetryError::Exhausted { attempts: attempt });
                    }
                    let wait = self.policy.delay_for(attempt);
                    log::info!(
                        "{}: {} (attempt {}), waiting {}s",
                        operation,
                        error,
                        attempt,
                        wait.as_secs()
                    );
                    self.sleeper.sleep(wait);
                }
                Err(error) => return Err(RetryError::Operation(error)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Debug)]
    struct FakeError {
        throttled: bool,
    }

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(if self.throttled { "rate limited" } else { "boom" })
        }
    }

    impl Throttled for FakeError {
        fn is_rate_limited(&self) -> bool {
            self.throttled
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        sleeps: RefCell<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(5))
    }

    #[test]
    fn test_delay_is_linear() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for(1), Duration::from_secs(5));
        assert_eq!(p.delay_for(4), Duration::from_secs(20));
        assert_eq!(p.max_attempts, 100);
    }

    #[test]
    fn test_success_after_n_rate_limits() {
        let sleeper = RecordingSleeper::default();
        let retrier = RateLimitedRetrier::with_sleeper(policy(100), &sleeper);
        let calls = Cell::new(0);

        let result: Result<&str, RetryError<FakeError>> = retrier.execute("test", || {
            calls.set(calls.get() + 1);
            if calls.get() <= 3 {
                Err(FakeError { throttled: true })
            } else {
                Ok("done")
            }
        });

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 4);
        let total: Duration = sleeper.sleeps.borrow().iter().sum();
        // 5 × (1 + 2 + 3)
        assert_eq!(total, Duration::from_secs(30));
    }

    #[test]
    fn test_exhausted_exactly_at_max_attempts() {
        let sleeper = RecordingSleeper::default();
        let retrier = RateLimitedRetrier::with_sleeper(policy(7), &sleeper);
        let calls = Cell::new(0u32);

        let result: Result<(), RetryError<FakeError>> = retrier.execute("test", || {
            calls.set(calls.get() + 1);
            Err(FakeError { throttled: true })
        });

        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 7 })));
        assert_eq!(calls.get(), 7);
        assert_eq!(sleeper.sleeps.borrow().len(), 6);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let sleeper = RecordingSleeper::default();
        let retrier = RateLimitedRetrier::with_sleeper(policy(100), &sleeper);
        let calls = Cell::new(0u32);

        let result: Result<(), RetryError<FakeError>> = retrier.execute("test", || {
            calls.set(calls.get() + 1);
            Err(FakeError { throttled: false })
        });

        assert!(matches!(result, Err(RetryError::Operation(FakeError { throttled: false }))));
        assert_eq!(calls.get(), 1);
        assert!(sleeper.sleeps.borrow().is_empty());
    }

    #[test]
    fn test_backoff_restarts_for_each_call() {
        let sleeper = RecordingSleeper::default();
        let retrier = RateLimitedRetrier::with_sleeper(policy(100), &sleeper);

        for _ in 0..2 {
            let throttled = Cell::new(true);
            let _: Result<(), RetryError<FakeError>> = retrier.execute("test", || {
                if throttled.replace(false) {
                    Err(FakeError { throttled: true })
                } else {
                    Ok(())
                }
            });
        }

        assert_eq!(
            *sleeper.sleeps.borrow(),
            vec![Duration::from_secs(5), Duration::from_secs(5)]
        );
    }
}
