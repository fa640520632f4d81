use serde_json::Value;
use settle_core::{DriverError, Locator, PageDriver};

use super::js;

/// Snapshot of how many elements currently match `locator`.
pub async fn count_matches<D: PageDriver + ?Sized>(page: &D, locator: &Locator) -> Result<usize, DriverError> {
    let script = js::build_locator_call(js::wait::COUNT_MATCHES, locator, &[]);
    let value = page.evaluate(&script).await?;
    value.as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| DriverError::Script(format!("expected a match count for {}, got {}", locator, value)))
}

/// Displayed flag of every match, in document order.
pub async fn displayed_states<D: PageDriver + ?Sized>(page: &D, locator: &Locator) -> Result<Vec<bool>, DriverError> {
    let script = js::build_locator_call(js::element::DISPLAYED_STATES, locator, &[]);
    match page.evaluate(&script).await? {
        Value::Array(items) => Ok(items.iter().map(|v| v.as_bool().unwrap_or(false)).collect()),
        other => Err(DriverError::Script(format!("expected displayed states for {}, got {}", locator, other))),
    }
}

/// Evaluate an element action snippet; `Ok(false)` when nothing matched.
pub async fn run_element_action<D: PageDriver + ?Sized>(
    page: &D,
    func: &str,
    locator: &Locator,
    args: &[Value],
) -> Result<bool, DriverError> {
    let script = js::build_locator_call(func, locator, args);
    let result = page.evaluate(&script).await?;
    Ok(result.get("success").and_then(|v| v.as_bool()).unwrap_or(false))
}
