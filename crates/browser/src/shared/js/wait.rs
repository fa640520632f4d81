pub const DOCUMENT_READY: &str = r#"document.readyState == "complete""#;

/// Throws when jQuery is absent, which the AJAX check treats as "cannot tell".
pub const AJAX_IDLE: &str = "window.jQuery.active == 0";

pub const COUNT_MATCHES: &str = r#"
(nodes) => nodes.length
"#;

pub const ELEMENT_HIDDEN: &str = r#"
(nodes, index) => {
    const el = nodes[index - 1];
    if (!el) return true;
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    const visible = rect.width > 0 && rect.height > 0 &&
                    style.visibility !== 'hidden' && style.display !== 'none';
    return !visible;
}
"#;

pub const ELEMENT_VISIBLE: &str = r#"
(nodes) => {
    const el = nodes[0];
    if (!el) return false;
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return rect.width > 0 && rect.height > 0 &&
           style.visibility !== 'hidden' && style.display !== 'none';
}
"#;
