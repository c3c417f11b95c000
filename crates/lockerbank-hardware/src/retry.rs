//! Retry with exponential backoff.
//!
//! Only link setup is retried. Locker commands are never resent
//! automatically: a solenoid pulse that reached the board but whose write
//! reported an error would otherwise fire twice.

use crate::config::RetryPolicy;
use crate::error::Result;
use std::future::Future;
use tracing::{info, warn};

/// Run `operation` until it succeeds or the policy's attempts are spent.
///
/// The closure receives the 1-based attempt number. Between attempts the
/// task sleeps for [`RetryPolicy::backoff`]. The last error is returned when
/// every attempt failed.
///
/// # Examples
///
/// ```
/// use lockerbank_hardware::config::RetryPolicy;
/// use lockerbank_hardware::retry::with_retry;
/// use lockerbank_hardware::HardwareError;
///
/// #[tokio::main(flavor = "current_thread", start_paused = true)]
/// async fn main() {
///     let result = with_retry(&RetryPolicy::attempts(3), "probe", |attempt| async move {
///         if attempt < 3 {
///             Err(HardwareError::communication("not yet"))
///         } else {
///             Ok(attempt)
///         }
///     })
///     .await;
///
///     assert_eq!(result.unwrap(), 3);
/// }
/// ```
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut f: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match f(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(operation, attempt, max_attempts, error = %e, "Giving up");
                return Err(e);
            }
        }
    }
}
