use settle_core::{DriverError, PageDriver, Predicate, Timeout, WaitOutcome};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::shared::js;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// About 30 years. Deadline used when `start + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Re-evaluates a predicate until it holds or the timeout runs out.
#[derive(Debug, Clone, Copy)]
pub struct JsPredicatePoller {
    interval: Duration,
}

impl JsPredicatePoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval: interval.max(MIN_INTERVAL) }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `Satisfied` as soon as the predicate is true, `TimedOut` once the whole
    /// budget is spent. Evaluation failures are returned as-is.
    pub async fn poll<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        predicate: &Predicate,
        timeout: Timeout,
    ) -> Result<WaitOutcome, DriverError> {
        let script = js::predicate_script(predicate);
        let start = Instant::now();
        let deadline = start
            .checked_add(timeout.as_duration())
            .unwrap_or_else(|| start + FAR_FUTURE);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if page.evaluate(&script).await?.as_bool() == Some(true) {
                debug!(
                    predicate = %predicate,
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "predicate satisfied"
                );
                return Ok(WaitOutcome::Satisfied);
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(predicate = %predicate, attempts, timeout_secs = timeout.secs(), "predicate timed out");
                return Ok(WaitOutcome::TimedOut { predicate: predicate.describe(), timeout });
            }

            sleep(self.interval.min(deadline - now)).await;
        }
    }
}
