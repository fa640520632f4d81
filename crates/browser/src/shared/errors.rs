use chromiumoxide::error::CdpError;
use settle_core::DriverError;

pub fn to_driver_error(e: CdpError) -> DriverError {
    if let CdpError::JavascriptException(details) = &e {
        let description = details.exception.as_ref().and_then(|obj| obj.description.as_deref());
        return DriverError::Script(exception_message(&details.text, description));
    }
    classify(&e.to_string())
}

/// Chrome puts only "Uncaught" in `text`; the thrown error lives in the description.
fn exception_message(text: &str, description: Option<&str>) -> String {
    match description {
        Some(d) if !d.trim().is_empty() => d.to_string(),
        _ => text.to_string(),
    }
}

pub(crate) fn classify(s: &str) -> DriverError {
    if s.contains("Cannot find context") || s.contains("Execution context was destroyed") {
        DriverError::ContextLost(s.to_string())
    } else if s.contains("TypeError") || s.contains("ReferenceError") || s.contains("Uncaught") {
        DriverError::Script(s.to_string())
    } else if s.contains("os error") || s.contains("No such file") {
        DriverError::Io(s.to_string())
    } else {
        DriverError::Protocol(s.to_string())
    }
}
