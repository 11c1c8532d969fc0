use crate::pacing::{sleep_random, WaitRange};
use anyhow::Result;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub wait: WaitRange,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, wait: WaitRange) -> Self {
        Self { max_attempts, wait }
    }
}

/// Result of a retried operation. Exhaustion is a value, not an error, so a
/// caller has to look at it before using the result.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, failed_attempts: u32 },
    Exhausted { attempts: u32, last_error: String },
}

impl<T> RetryOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }

    /// Number of attempts that ended in an error (one logged line each).
    pub fn failed_attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded {
                failed_attempts, ..
            } => *failed_attempts,
            RetryOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Some(value),
            RetryOutcome::Exhausted { .. } => None,
        }
    }

    pub fn into_result(self, operation_name: &str) -> Result<T> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Ok(value),
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(anyhow::anyhow!(
                "{} failed after {} attempts. Last error: {}",
                operation_name,
                attempts,
                last_error
            )),
        }
    }
}

pub async fn execute_with_retry<F, Fut, T, E>(
    operation: F,
    retry_config: &RetryConfig,
    operation_name: &str,
) -> RetryOutcome<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    let mut last_error = String::from("no attempts were made");

    while attempt <= retry_config.max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("✅ {} succeeded on attempt {}", operation_name, attempt);
                }
                return RetryOutcome::Succeeded {
                    value,
                    failed_attempts: attempt - 1,
                };
            }
            Err(e) => {
                last_error = e.to_string();
                error!(
                    "❌ {} failed on attempt {}/{}: {}",
                    operation_name, attempt, retry_config.max_attempts, last_error
                );

                if attempt < retry_config.max_attempts {
                    sleep_random(retry_config.wait).await;
                }
            }
        }

        attempt += 1;
    }

    RetryOutcome::Exhausted {
        attempts: retry_config.max_attempts,
        last_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(max_attempts, WaitRange::zero())
    }

    #[tokio::test]
    async fn test_retry_success_on_first_attempt() {
        let call_count = AtomicU32::new(0);

        let outcome = execute_with_retry(
            || {
                let count = call_count.fetch_add(1, Ordering::SeqCst);
                async move {
                    if count == 0 {
                        Ok("success")
                    } else {
                        Err("unexpected call")
                    }
                }
            },
            &fast_config(3),
            "test_operation",
        )
        .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.failed_attempts(), 0);
        assert_eq!(outcome.value(), Some("success"));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_four_failures() {
        let call_count = AtomicU32::new(0);

        let outcome = execute_with_retry(
            || {
                let count = call_count.fetch_add(1, Ordering::SeqCst);
                async move {
                    if count < 4 {
                        Err(anyhow::anyhow!("transient failure {}", count))
                    } else {
                        Ok(42u32)
                    }
                }
            },
            &fast_config(5),
            "test_operation",
        )
        .await;

        assert_eq!(outcome.failed_attempts(), 4);
        assert_eq!(outcome.value(), Some(42));
        assert_eq!(call_count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_retry_exhausted_yields_no_value() {
        let call_count = AtomicU32::new(0);

        let outcome = execute_with_retry(
            || {
                call_count.fetch_add(1, Ordering::SeqCst);
                async move { Err::<u32, anyhow::Error>(anyhow::anyhow!("always fails")) }
            },
            &fast_config(3),
            "test_operation",
        )
        .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_attempts(), 3);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        match outcome {
            RetryOutcome::Exhausted { last_error, .. } => assert_eq!(last_error, "always fails"),
            RetryOutcome::Succeeded { .. } => panic!("expected exhaustion"),
        }
    }

    #[tokio::test]
    async fn test_into_result_reports_operation_name() {
        let outcome: RetryOutcome<()> = RetryOutcome::Exhausted {
            attempts: 2,
            last_error: "timeout".to_string(),
        };
        let err = outcome.into_result("Fetch nonce").unwrap_err();
        assert!(err.to_string().contains("Fetch nonce failed after 2 attempts"));
    }
}
