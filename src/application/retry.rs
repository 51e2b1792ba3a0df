use std::future::Future;
use std::time::Duration;

use crate::app_error::{AppError, AppResult};

/// Bounded retry with a fixed inter-attempt delay.
///
/// Callers compose this explicitly instead of open-coding attempt loops.
/// Only errors the predicate accepts are retried; everything else (and the
/// final failed attempt) propagates unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    max_attempts: u32,
    delay: Duration,
}

/// Transient infrastructure failures are worth another attempt. Input,
/// uniqueness, and provider-classified errors never are.
pub fn is_transient(err: &AppError) -> bool {
    matches!(err, AppError::Database(_) | AppError::Internal(_))
}

impl Retry {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds, retrying transient errors.
    pub async fn run<T, F, Fut>(&self, op_name: &str, op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        self.run_if(op_name, op, is_transient).await
    }

    /// Run `op` until it succeeds, retrying errors the predicate accepts.
    pub async fn run_if<T, F, Fut, P>(&self, op_name: &str, mut op: F, retry_if: P) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
        P: Fn(&AppError) -> bool,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && retry_if(&err) => {
                    tracing::warn!(
                        op = op_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Attempt failed, retrying after delay"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry(max_attempts: u32) -> Retry {
        Retry::new(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn succeeds_first_attempt_without_delay() {
        let calls = AtomicU32::new(0);
        let result = fast_retry(3)
            .run("op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = fast_retry(3)
            .run("op", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(AppError::Database("deadlock".into()))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = fast_retry(3)
            .run("op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::Database("still down".into())) }
            })
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = fast_retry(3)
            .run("op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::EmailTaken) }
            })
            .await;
        assert!(matches!(result, Err(AppError::EmailTaken)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn custom_predicate_overrides_default() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = fast_retry(2)
            .run_if(
                "op",
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(AppError::NotFound) }
                },
                |err| matches!(err, AppError::NotFound),
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        assert_eq!(Retry::new(0, Duration::ZERO).max_attempts(), 1);
    }
}
