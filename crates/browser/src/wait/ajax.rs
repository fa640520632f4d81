use settle_core::{PageDriver, Predicate, Timeout, WaitOutcome};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use super::JsPredicatePoller;
use crate::shared::js;

pub const AJAX_IDLE: Predicate = Predicate::static_script("jQuery to have no active requests", js::wait::AJAX_IDLE);

/// Slept after every AJAX check for requests that were triggered but not yet counted.
pub const AJAX_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct AjaxIdleCheck {
    poller: JsPredicatePoller,
}

impl AjaxIdleCheck {
    pub fn new(poller: JsPredicatePoller) -> Self {
        Self { poller }
    }

    /// Never fails. If the predicate cannot be evaluated (no jQuery, driver
    /// hiccup) the whole timeout is slept instead, then the grace delay.
    pub async fn wait<D: PageDriver + ?Sized>(&self, page: &D, timeout: Timeout) -> WaitOutcome {
        let outcome = match self.poller.poll(page, &AJAX_IDLE, timeout).await {
            Ok(WaitOutcome::Satisfied) => WaitOutcome::Satisfied,
            Ok(timed_out) => {
                warn!(timeout_secs = timeout.secs(), "ajax requests still pending, continuing");
                timed_out
            }
            Err(e) => {
                warn!(
                    error = %e,
                    timeout_secs = timeout.secs(),
                    "js never executed, performing flat wait"
                );
                sleep(timeout.as_duration()).await;
                WaitOutcome::TimedOut { predicate: AJAX_IDLE.describe(), timeout }
            }
        };

        sleep(AJAX_GRACE).await;
        outcome
    }
}
