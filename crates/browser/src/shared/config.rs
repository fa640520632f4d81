use settle_core::{LOADING_MASK_LOCATORS, Locator, Timeout, WaitError};
use std::sync::Arc;
use std::time::Duration;

pub const ENV_PAGELOAD_TIMEOUT: &str = "SETTLE_PAGELOAD_TIMEOUT";
pub const ENV_POLL_INTERVAL_MS: &str = "SETTLE_POLL_INTERVAL_MS";
pub const ENV_BASE_URL: &str = "SETTLE_BASE_URL";

#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Budget used whenever a wait is called without an explicit timeout
    pub page_load_timeout: Timeout,
    pub poll_interval: Duration,
    /// Loading overlays, visited in order
    pub mask_locators: Arc<[Locator]>,
    pub base_url: Option<String>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            page_load_timeout: Timeout::DEFAULT_PAGE_LOAD,
            poll_interval: Duration::from_millis(100),
            mask_locators: Arc::from(LOADING_MASK_LOCATORS.to_vec()),
            base_url: None,
        }
    }
}

impl WaitConfig {
    pub fn with_page_load_timeout(mut self, timeout: Timeout) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval = Duration::from_millis(ms);
        self
    }

    pub fn with_mask_locators(mut self, locators: Vec<Locator>) -> Self {
        self.mask_locators = Arc::from(locators);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn fast() -> Self {
        Self {
            page_load_timeout: Timeout::clamped(10),
            poll_interval: Duration::from_millis(50),
            ..Self::default()
        }
    }

    pub fn patient() -> Self {
        Self {
            page_load_timeout: Timeout::clamped(60),
            poll_interval: Duration::from_millis(250),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, WaitError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` yields for the `SETTLE_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WaitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_PAGELOAD_TIMEOUT) {
            let secs: u64 = raw.trim().parse()
                .map_err(|_| WaitError::config(format!("{} must be whole seconds, got '{}'", ENV_PAGELOAD_TIMEOUT, raw)))?;
            config.page_load_timeout = Timeout::from_secs(secs)?;
        }

        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            let ms: u64 = raw.trim().parse()
                .map_err(|_| WaitError::config(format!("{} must be milliseconds, got '{}'", ENV_POLL_INTERVAL_MS, raw)))?;
            if ms == 0 {
                return Err(WaitError::config(format!("{} must be positive", ENV_POLL_INTERVAL_MS)));
            }
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = Some(url.trim().to_string());
        }

        Ok(config)
    }

    pub fn resolve(&self, timeout: Option<Timeout>) -> Timeout {
        timeout.unwrap_or(self.page_load_timeout)
    }

    /// Absolute URLs pass through; anything else is joined onto `base_url`.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/')),
            None => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = WaitConfig::default();
        assert_eq!(config.page_load_timeout.secs(), 30);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.mask_locators.len(), 5);
        assert_eq!(config.mask_locators[0], LOADING_MASK_LOCATORS[0]);
    }

    #[test]
    fn test_resolve_prefers_explicit_timeout() {
        let config = WaitConfig::default();
        assert_eq!(config.resolve(None).secs(), 30);
        assert_eq!(config.resolve(Some(Timeout::clamped(4))).secs(), 4);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = WaitConfig::from_lookup(lookup(&[
            (ENV_PAGELOAD_TIMEOUT, "45"),
            (ENV_POLL_INTERVAL_MS, "20"),
            (ENV_BASE_URL, "http://magento.test/"),
        ]))
        .unwrap();
        assert_eq!(config.page_load_timeout.secs(), 45);
        assert_eq!(config.poll_interval, Duration::from_millis(20));
        assert_eq!(config.base_url.as_deref(), Some("http://magento.test/"));
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(WaitConfig::from_lookup(lookup(&[(ENV_PAGELOAD_TIMEOUT, "0")])).is_err());
        assert!(WaitConfig::from_lookup(lookup(&[(ENV_PAGELOAD_TIMEOUT, "ten")])).is_err());
        assert!(WaitConfig::from_lookup(lookup(&[(ENV_POLL_INTERVAL_MS, "0")])).is_err());
    }

    #[test]
    fn test_resolve_url() {
        let config = WaitConfig::default().with_base_url("http://magento.test/");
        assert_eq!(config.resolve_url("/admin"), "http://magento.test/admin");
        assert_eq!(config.resolve_url("https://other.test/x"), "https://other.test/x");
        assert_eq!(WaitConfig::default().resolve_url("/admin"), "/admin");
    }

    #[test]
    fn test_presets() {
        assert!(WaitConfig::fast().page_load_timeout < WaitConfig::patient().page_load_timeout);
        assert_eq!(WaitConfig::fast().mask_locators.len(), 5);
    }
}
