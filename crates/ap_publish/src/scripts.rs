//! JavaScript snippets evaluated inside the editor page.

use serde_json::Value;

/// Hides the automation flag before any page script runs.
pub const STEALTH: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
window.chrome = window.chrome || { runtime: {} };
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
"#;

fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Paste `html` at the caret. Dispatches a synthetic paste event first and
/// falls back to `insertHTML` when the editor leaves the DOM untouched.
/// Evaluates to `true` when something was inserted.
pub fn paste_html(html: &str) -> String {
    format!(
        r#"(() => {{
    const html = {html};
    const target = document.activeElement || document.body;
    const before = target.innerHTML;
    try {{
        const data = new DataTransfer();
        data.setData('text/html', html);
        data.setData('text/plain', html.replace(/<[^>]*>/g, ''));
        const event = new ClipboardEvent('paste', {{ clipboardData: data, bubbles: true, cancelable: true }});
        target.dispatchEvent(event);
    }} catch (e) {{}}
    if (target.innerHTML === before) {{
        document.execCommand('insertHTML', false, html);
    }}
    return target.innerHTML !== before;
}})()"#,
        html = js_string(html)
    )
}

/// Click the first element matching `selector` from script. Evaluates to
/// `true` if an element was found.
pub fn click(selector: &str) -> String {
    format!(
        r#"(() => {{
    const el = document.querySelector({selector});
    if (!el) return false;
    el.scrollIntoView({{ block: 'center' }});
    el.click();
    return true;
}})()"#,
        selector = js_string(selector)
    )
}

pub fn count(selector: &str) -> String {
    format!("document.querySelectorAll({}).length", js_string(selector))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_json_escaped() {
        let script = paste_html(r#"<p class="x">It's "quoted"</p>"#);
        assert!(script.contains(r#""<p class=\"x\">It's \"quoted\"</p>""#));

        let script = click(r#"button[data-testid="publishConfirmButton"]"#);
        assert!(script.contains(r#"document.querySelector("button[data-testid=\"publishConfirmButton\"]")"#));
    }

    #[test]
    fn test_count_script() {
        assert_eq!(count("img"), r#"document.querySelectorAll("img").length"#);
    }
}
