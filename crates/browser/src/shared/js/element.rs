pub const FIND_ALL: &str = r#"
(kind, value) => {
    if (kind === 'xpath') {
        const snap = document.evaluate(value, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        const out = [];
        for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
        return out;
    }
    return Array.from(document.querySelectorAll(value));
}
"#;

pub const DISPLAYED_STATES: &str = r#"
(nodes) => nodes.map(el => {
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return rect.width > 0 && rect.height > 0 &&
           style.visibility !== 'hidden' && style.display !== 'none';
})
"#;

pub const CLICK: &str = r#"
(nodes) => {
    const el = nodes[0];
    if (!el) return { success: false, error: 'Element not found' };
    el.scrollIntoView({ block: 'center' });
    el.click();
    return { success: true };
}
"#;

pub const FILL_FIELD: &str = r#"
(nodes, text) => {
    const el = nodes[0];
    if (!el) return { success: false, error: 'Element not found' };
    el.focus();
    el.value = text;
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    el.dispatchEvent(new KeyboardEvent('keyup', { bubbles: true }));
    return { success: true };
}
"#;
