pub mod element;
pub mod wait;

use serde_json::{Value, json};
use settle_core::{Locator, Predicate};

pub fn build_js_call(func: &str, args: &[Value]) -> String {
    let args_str = args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})({})", func, args_str)
}

/// Call `func` with the locator's matches (document order) as its first argument.
pub fn build_locator_call(func: &str, locator: &Locator, args: &[Value]) -> String {
    let nodes = build_js_call(element::FIND_ALL, &[json!(locator.kind()), json!(locator.value())]);
    let rest = args.iter()
        .map(|v| format!(", {}", v))
        .collect::<String>();
    format!("({})({}{})", func, nodes, rest)
}

/// Script whose boolean result decides the predicate.
pub fn predicate_script(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Script { script, .. } => script.to_string(),
        Predicate::ElementNotVisible(target) => {
            build_locator_call(wait::ELEMENT_HIDDEN, &target.locator, &[json!(target.index)])
        }
    }
}
