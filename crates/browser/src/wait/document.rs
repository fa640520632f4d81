use settle_core::{PageDriver, Predicate, Timeout, WaitError, WaitOutcome};

use super::JsPredicatePoller;
use crate::shared::js;

pub const DOCUMENT_READY: Predicate =
    Predicate::static_script("document.readyState to be complete", js::wait::DOCUMENT_READY);

#[derive(Debug, Clone, Copy)]
pub struct DocumentReadyCheck {
    poller: JsPredicatePoller,
}

impl DocumentReadyCheck {
    pub fn new(poller: JsPredicatePoller) -> Self {
        Self { poller }
    }

    pub async fn wait<D: PageDriver + ?Sized>(&self, page: &D, timeout: Timeout) -> Result<WaitOutcome, WaitError> {
        self.poller
            .poll(page, &DOCUMENT_READY, timeout)
            .await
            .map_err(|e| WaitError::evaluation(&DOCUMENT_READY, e))
    }
}
