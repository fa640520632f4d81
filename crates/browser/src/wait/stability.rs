use settle_core::{PageDriver, Timeout, WaitError, WaitOutcome};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use super::{AjaxIdleCheck, DocumentReadyCheck, JsPredicatePoller, LoadingMaskAbsenceCheck};
use crate::shared::WaitConfig;

/// Outcome of each readiness step of one `await_stable` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityReport {
    pub timeout: Timeout,
    pub document: WaitOutcome,
    pub ajax: WaitOutcome,
    pub masks: WaitOutcome,
    pub elapsed: Duration,
}

impl StabilityReport {
    /// AJAX timeouts never count against stability.
    pub fn is_stable(&self) -> bool {
        self.document.is_satisfied() && self.masks.is_satisfied()
    }

    /// Turn a document-ready or loading-mask timeout into a failed wait.
    pub fn ensure_stable(self) -> Result<Self, WaitError> {
        self.document.clone().into_result()?;
        self.masks.clone().into_result()?;
        Ok(self)
    }
}

/// Document ready, then AJAX idle, then no loading masks.
///
/// Each step gets the full timeout, and a step that times out does not stop
/// the ones after it.
#[derive(Debug, Clone)]
pub struct PageStabilityWaiter {
    config: WaitConfig,
    poller: JsPredicatePoller,
    document: DocumentReadyCheck,
    ajax: AjaxIdleCheck,
    masks: LoadingMaskAbsenceCheck,
}

impl PageStabilityWaiter {
    pub fn new(config: WaitConfig) -> Self {
        let poller = JsPredicatePoller::new(config.poll_interval);
        Self {
            poller,
            document: DocumentReadyCheck::new(poller),
            ajax: AjaxIdleCheck::new(poller),
            masks: LoadingMaskAbsenceCheck::new(poller, config.mask_locators.clone()),
            config,
        }
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    pub fn poller(&self) -> &JsPredicatePoller {
        &self.poller
    }

    pub async fn await_stable<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        timeout: Option<Timeout>,
    ) -> Result<StabilityReport, WaitError> {
        let timeout = self.config.resolve(timeout);
        let start = Instant::now();

        let document = self.document.wait(page, timeout).await?;
        let ajax = self.ajax.wait(page, timeout).await;
        let masks = self.masks.wait(page, timeout).await?;

        let report = StabilityReport {
            timeout,
            document,
            ajax,
            masks,
            elapsed: start.elapsed(),
        };
        info!(
            stable = report.is_stable(),
            timeout_secs = timeout.secs(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "page stability wait finished"
        );
        Ok(report)
    }

    pub async fn await_document_ready<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        timeout: Option<Timeout>,
    ) -> Result<(), WaitError> {
        self.document.wait(page, self.config.resolve(timeout)).await?.into_result()
    }

    pub async fn await_ajax_idle<D: PageDriver + ?Sized>(&self, page: &D, timeout: Option<Timeout>) -> WaitOutcome {
        self.ajax.wait(page, self.config.resolve(timeout)).await
    }

    pub async fn await_loading_masks_gone<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        timeout: Option<Timeout>,
    ) -> Result<(), WaitError> {
        self.masks.wait(page, self.config.resolve(timeout)).await?.into_result()
    }
}
