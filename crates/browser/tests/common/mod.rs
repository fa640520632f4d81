#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use settle_browser::shared::js;
use settle_browser::{DriverError, Locator, PageDriver, Predicate};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Readiness-relevant script evaluations, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DocumentReady,
    Ajax,
    Count(Locator),
    Hidden(Locator, usize),
}

/// Scripted page whose state is a function of (virtual) time since creation.
pub struct FakePage {
    start: Instant,
    ready_after: Option<Duration>,
    /// `None` means jQuery is not loaded and the idle check throws
    jquery_idle_after: Option<Duration>,
    broken: bool,
    fail_screenshot: bool,
    /// Per mask locator: when each match becomes hidden (`None` = never)
    masks: Vec<(Locator, Vec<Option<Duration>>)>,
    /// Interactive elements: displayed flag of each match
    elements: Vec<(Locator, Vec<bool>)>,
    pub calls: Mutex<Vec<Call>>,
    pub clicks: Mutex<Vec<String>>,
    pub fills: Mutex<Vec<(String, String)>>,
    pub visited: Mutex<Vec<String>>,
}

impl FakePage {
    /// Document complete, jQuery idle, no masks.
    pub fn stable() -> Self {
        Self {
            start: Instant::now(),
            ready_after: Some(Duration::ZERO),
            jquery_idle_after: Some(Duration::ZERO),
            broken: false,
            fail_screenshot: false,
            masks: Vec::new(),
            elements: Vec::new(),
            calls: Mutex::new(Vec::new()),
            clicks: Mutex::new(Vec::new()),
            fills: Mutex::new(Vec::new()),
            visited: Mutex::new(Vec::new()),
        }
    }

    pub fn ready_after(mut self, after: Option<Duration>) -> Self {
        self.ready_after = after;
        self
    }

    pub fn without_jquery(mut self) -> Self {
        self.jquery_idle_after = None;
        self
    }

    pub fn jquery_idle_after(mut self, after: Duration) -> Self {
        self.jquery_idle_after = Some(after);
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    pub fn failing_screenshot(mut self) -> Self {
        self.fail_screenshot = true;
        self
    }

    pub fn mask(mut self, locator: Locator, hidden_after: Vec<Option<Duration>>) -> Self {
        self.masks.push((locator, hidden_after));
        self
    }

    pub fn element(mut self, locator: Locator, displayed: Vec<bool>) -> Self {
        self.elements.push((locator, displayed));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().unwrap().clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.fills.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn elapsed_at_least(&self, after: Option<Duration>) -> bool {
        after.is_some_and(|t| self.start.elapsed() >= t)
    }

    fn mask_hidden_after(&self, locator: &Locator) -> Vec<Option<Duration>> {
        self.masks
            .iter()
            .find(|(l, _)| l == locator)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    fn eval_masks(&self, script: &str) -> Option<Value> {
        let mut known: Vec<Locator> = self.masks.iter().map(|(l, _)| l.clone()).collect();
        known.extend(settle_browser::LOADING_MASK_LOCATORS.iter().cloned());

        for locator in known {
            let hidden_after = self.mask_hidden_after(&locator);
            if script == js::build_locator_call(js::wait::COUNT_MATCHES, &locator, &[]) {
                self.record(Call::Count(locator.clone()));
                return Some(json!(hidden_after.len()));
            }
            for index in 1..=hidden_after.len().max(1) {
                let predicate = Predicate::ElementNotVisible(locator.nth(index));
                if script == js::predicate_script(&predicate) {
                    self.record(Call::Hidden(locator.clone(), index));
                    let hidden = match hidden_after.get(index - 1) {
                        Some(after) => self.elapsed_at_least(*after),
                        None => true,
                    };
                    return Some(json!(hidden));
                }
            }
        }
        None
    }

    fn eval_elements(&self, script: &str) -> Option<Value> {
        for (locator, displayed) in &self.elements {
            if script == js::build_locator_call(js::element::DISPLAYED_STATES, locator, &[]) {
                return Some(json!(displayed));
            }
            if script == js::build_locator_call(js::wait::ELEMENT_VISIBLE, locator, &[]) {
                return Some(json!(displayed.first().copied().unwrap_or(false)));
            }
            if script == js::build_locator_call(js::element::CLICK, locator, &[]) {
                if displayed.is_empty() {
                    return Some(json!({ "success": false }));
                }
                self.clicks.lock().unwrap().push(locator.to_string());
                return Some(json!({ "success": true }));
            }
            let fill = js::build_locator_call(js::element::FILL_FIELD, locator, &[]);
            let prefix = &fill[..fill.len() - 1];
            if let Some(rest) = script.strip_prefix(prefix) {
                let text = rest.trim_start_matches(", ").trim_end_matches(')');
                let value: String = serde_json::from_str(text).unwrap();
                self.fills.lock().unwrap().push((locator.to_string(), value));
                return Some(json!({ "success": !displayed.is_empty() }));
            }
        }
        None
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn evaluate(&self, script: &str) -> Result<Value, DriverError> {
        if self.broken {
            return Err(DriverError::Protocol("websocket closed".to_string()));
        }
        if script == js::wait::DOCUMENT_READY {
            self.record(Call::DocumentReady);
            return Ok(json!(self.elapsed_at_least(self.ready_after)));
        }
        if script == js::wait::AJAX_IDLE {
            self.record(Call::Ajax);
            return match self.jquery_idle_after {
                Some(after) => Ok(json!(self.elapsed_at_least(Some(after)))),
                None => Err(DriverError::Script(
                    "Uncaught TypeError: Cannot read properties of undefined (reading 'active')".to_string(),
                )),
            };
        }
        if let Some(value) = self.eval_masks(script) {
            return Ok(value);
        }
        if let Some(value) = self.eval_elements(script) {
            return Ok(value);
        }
        // Unknown locators behave like an empty match set
        if script.starts_with(&format!("({})", js::element::DISPLAYED_STATES)) {
            return Ok(json!([]));
        }
        Ok(json!({ "success": false }))
    }

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        if self.fail_screenshot {
            return Err(DriverError::Protocol("Page.captureScreenshot failed".to_string()));
        }
        Ok(b"\x89PNG fake".to_vec())
    }

    async fn content(&self) -> Result<String, DriverError> {
        Ok("<html><body>admin</body></html>".to_string())
    }
}
