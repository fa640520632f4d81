mod ajax;
mod document;
mod mask;
mod poller;
mod stability;

pub use ajax::{AJAX_GRACE, AJAX_IDLE, AjaxIdleCheck};
pub use document::{DOCUMENT_READY, DocumentReadyCheck};
pub use mask::LoadingMaskAbsenceCheck;
pub use poller::JsPredicatePoller;
pub use stability::{PageStabilityWaiter, StabilityReport};
