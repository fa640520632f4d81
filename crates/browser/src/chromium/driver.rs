use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde_json::Value;
use std::path::Path;
use settle_core::{DriverError, PageDriver};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::shared::to_driver_error;

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub viewport: Option<(u32, u32)>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self { headless: true, viewport: Some((1920, 1080)) }
    }
}

/// `PageDriver` backed by a single Chromium tab.
pub struct ChromiumDriver {
    page: Page,
    _browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    /// Removed when the driver is dropped
    profile: Option<TempDir>,
}

impl ChromiumDriver {
    /// Wrap a tab whose browser is owned elsewhere.
    pub fn from_page(page: Page) -> Self {
        Self { page, _browser: None, handler: None, profile: None }
    }

    pub async fn launch(options: LaunchOptions) -> Result<Self, DriverError> {
        // Separate profile dir per instance, avoids SingletonLock conflicts
        let profile = profile_dir()?;

        let mut builder = ChromeConfig::builder()
            .headless_mode(if options.headless { HeadlessMode::True } else { HeadlessMode::False })
            .user_data_dir(profile.path());

        if let Some((w, h)) = options.viewport {
            builder = builder.window_size(w, h);
        }

        let chrome_cfg = builder.build()
            .map_err(|e| DriverError::Protocol(format!("Config failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(chrome_cfg).await
            .map_err(to_driver_error)?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser.new_page("about:blank").await
            .map_err(to_driver_error)?;
        info!(headless = options.headless, "chromium launched");

        Ok(Self { page, _browser: Some(browser), handler: Some(handler), profile: Some(profile) })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn profile_path(&self) -> Option<&Path> {
        self.profile.as_ref().map(TempDir::path)
    }
}

fn profile_dir() -> Result<TempDir, DriverError> {
    tempfile::Builder::new()
        .prefix("settle-chromium-")
        .tempdir()
        .map_err(|e| DriverError::Io(format!("Failed to create temp dir: {}", e)))
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn evaluate(&self, script: &str) -> Result<Value, DriverError> {
        let result = self.page.evaluate(script).await
            .map_err(to_driver_error)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        debug!(url, "navigating");
        self.page.goto(url).await
            .map_err(to_driver_error)?;
        self.page.wait_for_navigation().await
            .map_err(to_driver_error)?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.page.screenshot(params).await
            .map_err(to_driver_error)
    }

    async fn content(&self) -> Result<String, DriverError> {
        self.page.content().await
            .map_err(to_driver_error)
    }
}
