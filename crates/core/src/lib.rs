use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU64;
use std::time::Duration;
use thiserror::Error;

/// How an element is addressed on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    Css(Cow<'static, str>),
    XPath(Cow<'static, str>),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(Cow::Owned(selector.into()))
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(Cow::Owned(expr.into()))
    }

    pub const fn static_xpath(expr: &'static str) -> Self {
        Self::XPath(Cow::Borrowed(expr))
    }

    /// Tag understood by the JS helpers ("css" or "xpath")
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }

    /// Re-address the `index`-th match (1-based) of this locator.
    pub fn nth(&self, index: usize) -> IndexedLocator {
        IndexedLocator { locator: self.clone(), index }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// One positional match of a locator, e.g. `(//div[@data-role="spinner"])[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexedLocator {
    pub locator: Locator,
    /// 1-based position within the locator's match set
    pub index: usize,
}

impl fmt::Display for IndexedLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.locator {
            Locator::XPath(expr) => write!(f, "({})[{}]", expr, self.index),
            Locator::Css(sel) => write!(f, "{} >> nth={}", sel, self.index),
        }
    }
}

/// Known loading overlays, checked in this order.
pub const LOADING_MASK_LOCATORS: [Locator; 5] = [
    Locator::static_xpath(r#"//div[contains(@class, "loading-mask")]"#),
    Locator::static_xpath(r#"//div[contains(@class, "admin_data-grid-loading-mask")]"#),
    Locator::static_xpath(r#"//div[contains(@class, "admin__data-grid-loading-mask")]"#),
    Locator::static_xpath(r#"//div[contains(@class, "admin__form-loading-mask")]"#),
    Locator::static_xpath(r#"//div[@data-role="spinner"]"#),
];

/// Wait budget in whole seconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Timeout(NonZeroU64);

impl Timeout {
    pub const DEFAULT_PAGE_LOAD: Timeout = Timeout::clamped(30);

    pub fn from_secs(secs: u64) -> Result<Self, WaitError> {
        NonZeroU64::new(secs)
            .map(Self)
            .ok_or(WaitError::InvalidTimeout { secs })
    }

    /// Zero is bumped to one second.
    pub const fn clamped(secs: u64) -> Self {
        Self(NonZeroU64::MIN.saturating_add(secs.saturating_sub(1)))
    }

    pub const fn secs(self) -> u64 {
        self.0.get()
    }

    pub const fn as_duration(self) -> Duration {
        Duration::from_secs(self.0.get())
    }
}

impl TryFrom<u64> for Timeout {
    type Error = WaitError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<Timeout> for u64 {
    fn from(t: Timeout) -> u64 {
        t.secs()
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.secs())
    }
}

/// Side-effect-free check evaluated against the live page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// JS expression that yields a boolean
    Script {
        description: Cow<'static, str>,
        script: Cow<'static, str>,
    },
    /// The addressed element is absent or hidden
    ElementNotVisible(IndexedLocator),
}

impl Predicate {
    pub const fn static_script(description: &'static str, script: &'static str) -> Self {
        Self::Script {
            description: Cow::Borrowed(description),
            script: Cow::Borrowed(script),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Script { description, .. } => description.to_string(),
            Self::ElementNotVisible(target) => format!("{} to be not visible", target),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Result of a single poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied,
    TimedOut { predicate: String, timeout: Timeout },
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }

    /// Escalate a timeout into a failed wait.
    pub fn into_result(self) -> Result<(), WaitError> {
        match self {
            Self::Satisfied => Ok(()),
            Self::TimedOut { predicate, timeout } => Err(WaitError::PredicateNeverSatisfied {
                predicate,
                timeout_secs: timeout.secs(),
            }),
        }
    }
}

/// Failure talking to the browser while evaluating something
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("execution context lost: {0}")]
    ContextLost(String),
    #[error("browser protocol error: {0}")]
    Protocol(String),
    #[error("i/o error: {0}")]
    Io(String),
}

/// Error categories for better error handling and recovery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Readiness predicate never became true
    Timeout,
    /// JavaScript could not be evaluated
    ScriptExecution,
    /// Element missing or matched ambiguously
    ElementNotFound,
    /// Navigation or page load errors
    Navigation,
    /// Secret lookup failures
    Auth,
    /// Bad timeout or environment configuration
    Config,
    /// Failure artifacts could not be written
    Storage,
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("timed out after {timeout_secs}s waiting for {predicate}")]
    PredicateNeverSatisfied { predicate: String, timeout_secs: u64 },

    #[error("could not evaluate {predicate}: {source}")]
    Evaluation {
        predicate: String,
        #[source]
        source: DriverError,
    },

    #[error("more than one element matches selector {locator} ({count} found)")]
    AmbiguousElementMatch { locator: String, count: usize },

    #[error("element not found: {locator}")]
    ElementNotFound { locator: String },

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: DriverError,
    },

    #[error("timeout must be a positive number of seconds, got {secs}")]
    InvalidTimeout { secs: u64 },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("no credential stored for key {key}")]
    Credential { key: String },

    #[error("failed to store artifact: {message}")]
    Artifact { message: String },
}

impl WaitError {
    pub fn evaluation(predicate: impl fmt::Display, source: DriverError) -> Self {
        Self::Evaluation {
            predicate: predicate.to_string(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PredicateNeverSatisfied { .. } => ErrorCategory::Timeout,
            Self::Evaluation { .. } => ErrorCategory::ScriptExecution,
            Self::AmbiguousElementMatch { .. } | Self::ElementNotFound { .. } => {
                ErrorCategory::ElementNotFound
            }
            Self::Navigation { .. } => ErrorCategory::Navigation,
            Self::InvalidTimeout { .. } | Self::Config { .. } => ErrorCategory::Config,
            Self::Credential { .. } => ErrorCategory::Auth,
            Self::Artifact { .. } => ErrorCategory::Storage,
        }
    }

    /// Whether a calling test framework may reasonably retry the step
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Timeout | ErrorCategory::Navigation
        )
    }

    /// Structured details for reports and failure records
    pub fn context(&self) -> serde_json::Value {
        match self {
            Self::PredicateNeverSatisfied {
                predicate,
                timeout_secs,
            } => serde_json::json!({ "predicate": predicate, "timeout_secs": timeout_secs }),
            Self::Evaluation { predicate, source } => {
                serde_json::json!({ "predicate": predicate, "driver_error": source.to_string() })
            }
            Self::AmbiguousElementMatch { locator, count } => {
                serde_json::json!({ "selector": locator, "count": count })
            }
            Self::ElementNotFound { locator } => serde_json::json!({ "selector": locator }),
            Self::Navigation { url, source } => {
                serde_json::json!({ "url": url, "driver_error": source.to_string() })
            }
            Self::InvalidTimeout { secs } => serde_json::json!({ "secs": secs }),
            Self::Credential { key } => serde_json::json!({ "key": key }),
            Self::Config { .. } | Self::Artifact { .. } => serde_json::json!({}),
        }
    }
}

/// Browser session the waits and actions run against.
///
/// Element lookup, visibility and interaction are expressed as scripts, so a
/// backend only needs to evaluate JavaScript, navigate and capture the page.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Evaluate an expression and return its JSON value. A thrown exception
    /// must surface as `DriverError::Script`.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError>;

    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// PNG bytes of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;

    /// Serialized DOM of the current page
    async fn content(&self) -> Result<String, DriverError>;
}

/// Decrypted credential value. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(*****)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*****")
    }
}

/// Source of secret field values; decryption happens behind this seam.
pub trait CredentialStore: Send + Sync {
    fn resolve(&self, key: &str) -> Result<Secret, WaitError>;
}

/// Reads `SETTLE_SECRET_<KEY>` where the key is upper-cased and every
/// non-alphanumeric character becomes `_`.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    pub const PREFIX: &'static str = "SETTLE_SECRET_";

    pub fn env_key(key: &str) -> String {
        let normalized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", Self::PREFIX, normalized)
    }
}

impl CredentialStore for EnvCredentialStore {
    fn resolve(&self, key: &str) -> Result<Secret, WaitError> {
        std::env::var(Self::env_key(key))
            .map(Secret::new)
            .map_err(|_| WaitError::Credential { key: key.to_string() })
    }
}

/// In-memory store for local runs
#[derive(Debug, Clone, Default)]
pub struct MapCredentialStore {
    secrets: HashMap<String, Secret>,
}

impl MapCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(key.into(), Secret::new(value));
        self
    }
}

impl CredentialStore for MapCredentialStore {
    fn resolve(&self, key: &str) -> Result<Secret, WaitError> {
        self.secrets
            .get(key)
            .cloned()
            .ok_or_else(|| WaitError::Credential { key: key.to_string() })
    }
}
