use settle_core::{Locator, PageDriver, Predicate, Timeout, WaitError, WaitOutcome};
use std::sync::Arc;
use tracing::{debug, warn};

use super::JsPredicatePoller;
use crate::shared::dom;

/// Waits for every currently matching loading overlay to become hidden.
///
/// Matches are counted once per locator and then re-addressed by position,
/// so overlays added (or removed) after the count are not tracked.
#[derive(Debug, Clone)]
pub struct LoadingMaskAbsenceCheck {
    poller: JsPredicatePoller,
    locators: Arc<[Locator]>,
}

impl LoadingMaskAbsenceCheck {
    pub fn new(poller: JsPredicatePoller, locators: Arc<[Locator]>) -> Self {
        Self { poller, locators }
    }

    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    /// Stops at the first overlay that stays visible for the whole timeout.
    pub async fn wait<D: PageDriver + ?Sized>(&self, page: &D, timeout: Timeout) -> Result<WaitOutcome, WaitError> {
        for locator in self.locators.iter() {
            let count = dom::count_matches(page, locator)
                .await
                .map_err(|e| WaitError::evaluation(format!("matches of {}", locator), e))?;
            debug!(locator = %locator, count, "loading masks found");

            for index in 1..=count {
                let predicate = Predicate::ElementNotVisible(locator.nth(index));
                let outcome = self.poller
                    .poll(page, &predicate, timeout)
                    .await
                    .map_err(|e| WaitError::evaluation(&predicate, e))?;

                if !outcome.is_satisfied() {
                    warn!(locator = %locator, index, timeout_secs = timeout.secs(), "loading mask still visible");
                    return Ok(outcome);
                }
            }
        }
        Ok(WaitOutcome::Satisfied)
    }
}
