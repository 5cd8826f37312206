//! Image placeholder tokens embedded in generated HTML.
//!
//! Generated bodies mark image insertion points with literal HTML comments
//! such as `<!-- IMAGE 1 PLACEHOLDER -->`. The publisher splits the body on
//! these markers and pastes an image between the pieces.

use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\s*IMAGE\s+(\d+)\s+PLACEHOLDER\s*-->").expect("valid placeholder regex"));

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]+?>").expect("valid tag regex"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// The canonical token for the n-th image (1-based).
pub fn placeholder_token(n: usize) -> String {
    format!("<!-- IMAGE {} PLACEHOLDER -->", n)
}

/// Split the body on placeholder tokens. `n` placeholders yield `n + 1` pieces.
pub fn split_on_placeholders(html: &str) -> Vec<&str> {
    PLACEHOLDER_RE.split(html).collect()
}

/// An `<img>` element with escaped attributes.
pub fn image_html(url: &str, alt: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}">"#,
        html_escape::encode_double_quoted_attribute(url),
        html_escape::encode_double_quoted_attribute(alt)
    )
}

/// Plain text of an HTML snippet with collapsed whitespace.
pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_placeholders() {
        let html = "<p>a</p><!-- IMAGE 1 PLACEHOLDER --><p>b</p><!--IMAGE 2 PLACEHOLDER--><p>c</p>";
        assert_eq!(split_on_placeholders(html), vec!["<p>a</p>", "<p>b</p>", "<p>c</p>"]);
        assert_eq!(split_on_placeholders("<p>none</p>"), vec!["<p>none</p>"]);
        assert!(split_on_placeholders(&placeholder_token(1)).iter().all(|p| p.is_empty()));
    }

    #[test]
    fn test_image_html_escapes_attributes() {
        let html = image_html("https://x.test/a.jpg?a=1&b=2", r#"A "quoted" tart"#);
        assert_eq!(
            html,
            r#"<img src="https://x.test/a.jpg?a=1&amp;b=2" alt="A &quot;quoted&quot; tart">"#
        );
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>\n<br/>"), "Hello world");
    }
}
