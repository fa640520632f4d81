//! Page-readiness waits for browser-driven tests.
//!
//! [`PageStabilityWaiter`] waits for the document to finish loading, for
//! jQuery AJAX traffic to drain and for known loading overlays to disappear.
//! [`AdminActions`] layers admin-panel helpers on top of it.

pub mod actions;
pub mod chromium;
pub mod shared;
pub mod wait;

pub use actions::AdminActions;
pub use chromium::{ChromiumDriver, LaunchOptions};
pub use shared::WaitConfig;
pub use wait::{
    AjaxIdleCheck, DocumentReadyCheck, JsPredicatePoller, LoadingMaskAbsenceCheck, PageStabilityWaiter,
    StabilityReport,
};

pub use settle_core::{
    DriverError, ErrorCategory, LOADING_MASK_LOCATORS, Locator, PageDriver, Predicate, Timeout, WaitError,
    WaitOutcome,
};
