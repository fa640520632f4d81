use serde_json::json;
use settle_core::{
    CredentialStore, EnvCredentialStore, Locator, PageDriver, Predicate, Timeout, WaitError, WaitOutcome,
};
use settle_storage::{Artifact, ArtifactKind, ArtifactStore, FailureRecord};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::shared::{WaitConfig, dom, js};
use crate::wait::{PageStabilityWaiter, StabilityReport};

/// Admin-panel conveniences layered over a `PageDriver`: readiness waits,
/// secret filling, conditional clicks, multiselect helpers and
/// screenshot-on-failure.
pub struct AdminActions<D: PageDriver> {
    page: D,
    waiter: PageStabilityWaiter,
    credentials: Arc<dyn CredentialStore>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
}

impl<D: PageDriver> AdminActions<D> {
    pub fn new(page: D, config: WaitConfig) -> Self {
        Self {
            page,
            waiter: PageStabilityWaiter::new(config),
            credentials: Arc::new(EnvCredentialStore),
            artifacts: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_artifacts(mut self, artifacts: Arc<dyn ArtifactStore>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn page(&self) -> &D {
        &self.page
    }

    pub fn waiter(&self) -> &PageStabilityWaiter {
        &self.waiter
    }

    pub async fn open_page(&self, path: &str) -> Result<StabilityReport, WaitError> {
        let url = self.waiter.config().resolve_url(path);
        self.page.goto(&url).await
            .map_err(|source| WaitError::Navigation { url: url.clone(), source })?;
        self.wait_for_page_load(None).await
    }

    pub async fn wait_for_page_load(&self, timeout: Option<Timeout>) -> Result<StabilityReport, WaitError> {
        self.waiter.await_stable(&self.page, timeout).await?.ensure_stable()
    }

    pub async fn wait_for_ajax_load(&self, timeout: Option<Timeout>) -> WaitOutcome {
        self.waiter.await_ajax_idle(&self.page, timeout).await
    }

    pub async fn wait_for_loading_mask_to_disappear(&self, timeout: Option<Timeout>) -> Result<(), WaitError> {
        self.waiter.await_loading_masks_gone(&self.page, timeout).await
    }

    pub async fn wait_for_element_visible(&self, locator: &Locator, timeout: Option<Timeout>) -> Result<(), WaitError> {
        let predicate = Predicate::Script {
            description: format!("{} to be visible", locator).into(),
            script: js::build_locator_call(js::wait::ELEMENT_VISIBLE, locator, &[]).into(),
        };
        let timeout = self.waiter.config().resolve(timeout);
        self.waiter.poller()
            .poll(&self.page, &predicate, timeout)
            .await
            .map_err(|e| WaitError::evaluation(&predicate, e))?
            .into_result()
    }

    pub async fn click(&self, locator: &Locator) -> Result<(), WaitError> {
        let clicked = dom::run_element_action(&self.page, js::element::CLICK, locator, &[])
            .await
            .map_err(|e| WaitError::evaluation(format!("click on {}", locator), e))?;
        if !clicked {
            return Err(WaitError::ElementNotFound { locator: locator.to_string() });
        }
        info!(selector = %locator, "clicked");
        Ok(())
    }

    pub async fn fill_field(&self, locator: &Locator, value: &str) -> Result<(), WaitError> {
        self.fill(locator, value).await?;
        info!(selector = %locator, value, "filled field");
        Ok(())
    }

    /// Fill with a credential looked up by `key`; the value never reaches the logs.
    pub async fn fill_secret_field(&self, locator: &Locator, key: &str) -> Result<(), WaitError> {
        let secret = self.credentials.resolve(key)?;
        self.fill(locator, secret.expose()).await?;
        info!(selector = %locator, value = %secret, "filled secret field");
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), WaitError> {
        let filled = dom::run_element_action(&self.page, js::element::FILL_FIELD, locator, &[json!(value)])
            .await
            .map_err(|e| WaitError::evaluation(format!("fill of {}", locator), e))?;
        if !filled {
            return Err(WaitError::ElementNotFound { locator: locator.to_string() });
        }
        Ok(())
    }

    /// Click `locator` only when `dependent` is displayed (`visible == true`)
    /// or not displayed (`visible == false`). Returns whether it clicked.
    pub async fn conditional_click(&self, locator: &Locator, dependent: &Locator, visible: bool) -> Result<bool, WaitError> {
        let states = dom::displayed_states(&self.page, dependent)
            .await
            .map_err(|e| WaitError::evaluation(format!("matches of {}", dependent), e))?;

        if states.len() > 1 {
            return Err(WaitError::AmbiguousElementMatch {
                locator: dependent.to_string(),
                count: states.len(),
            });
        }

        let displayed = states.first().copied().unwrap_or(false);
        if displayed != visible {
            return Ok(false);
        }
        self.click(locator).await?;
        Ok(true)
    }

    /// Type each option into the search field and pick the matching result.
    pub async fn select_multiple_options<S: AsRef<str>>(
        &self,
        search_field: &Locator,
        search_result: &Locator,
        options: &[S],
    ) -> Result<(), WaitError> {
        for option in options {
            self.wait_for_page_load(None).await?;
            self.fill_field(search_field, "").await?;
            self.wait_for_page_load(None).await?;
            self.fill_field(search_field, option.as_ref()).await?;
            self.wait_for_page_load(None).await?;
            self.click(search_result).await?;
        }
        Ok(())
    }

    /// Drive the admin "advanced select" multiselect rooted at `select` (CSS).
    pub async fn search_and_multi_select_option<S: AsRef<str>>(
        &self,
        select: &str,
        options: &[S],
        require_action: bool,
    ) -> Result<(), WaitError> {
        let dropdown = Locator::css(format!("{} .action-select.admin__action-multiselect", select));
        let search_text = Locator::css(format!(
            "{} .admin__action-multiselect-search-wrap>input[data-role=\"advanced-select-text\"]",
            select
        ));
        let search_result = Locator::css(format!("{} .admin__action-multiselect-label>span", select));

        self.wait_for_page_load(None).await?;
        self.wait_for_element_visible(&dropdown, None).await?;
        self.click(&dropdown).await?;

        self.select_multiple_options(&search_text, &search_result, options).await?;

        if require_action {
            let action = Locator::css(format!("{} button[class=action-default]", select));
            self.wait_for_page_load(None).await?;
            self.click(&action).await?;
        }
        Ok(())
    }

    pub async fn make_screenshot(&self, name: &str) -> Result<PathBuf, WaitError> {
        let store = self.artifacts.as_ref()
            .ok_or_else(|| WaitError::config("no artifact store configured"))?;
        let bytes = self.page.screenshot().await
            .map_err(|e| WaitError::Artifact { message: format!("screenshot failed: {}", e) })?;
        store.save(&Artifact::new(name, ArtifactKind::Screenshot, bytes))
            .await
            .map_err(|e| WaitError::Artifact { message: e.to_string() })
    }

    /// Save screenshot, HTML and a JSON record for a failed step. Capture
    /// problems are logged and swallowed so the step's own error wins.
    pub async fn capture_failure(&self, step: &str, failure: &WaitError) -> Option<FailureRecord> {
        let store = self.artifacts.as_ref()?;
        let mut record = FailureRecord::from_error(step, failure);

        match self.page.screenshot().await {
            Ok(bytes) => match store.save(&Artifact::new(step, ArtifactKind::Screenshot, bytes)).await {
                Ok(path) => record.screenshot = Some(path),
                Err(e) => error!(step, error = %e, "failed to store screenshot"),
            },
            Err(e) => error!(step, error = %e, "failed to capture screenshot"),
        }

        match self.page.content().await {
            Ok(html) => match store.save(&Artifact::new(step, ArtifactKind::Html, html.into_bytes())).await {
                Ok(path) => record.html = Some(path),
                Err(e) => error!(step, error = %e, "failed to store page html"),
            },
            Err(e) => error!(step, error = %e, "failed to capture page html"),
        }

        match record.to_artifact() {
            Ok(artifact) => {
                if let Err(e) = store.save(&artifact).await {
                    error!(step, error = %e, "failed to store failure record");
                }
            }
            Err(e) => error!(step, error = %e, "failed to serialize failure record"),
        }

        error!(step, error = %failure, category = ?failure.category(), "step failed");
        Some(record)
    }

    /// Run one test step, capturing failure artifacts if it errors.
    pub async fn step<T, F>(&self, name: &str, step: F) -> Result<T, WaitError>
    where
        F: Future<Output = Result<T, WaitError>>,
    {
        match step.await {
            Ok(value) => {
                info!(step = name, "step passed");
                Ok(value)
            }
            Err(e) => {
                self.capture_failure(name, &e).await;
                Err(e)
            }
        }
    }
}
