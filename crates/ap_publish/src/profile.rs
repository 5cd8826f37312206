use std::time::Duration;

/// How long each step of the editor flow may take.
#[derive(Debug, Clone)]
pub struct Timings {
    pub element: Duration,
    pub image_upload: Duration,
    pub confirmation: Duration,
    pub poll: Duration,
    pub keystroke: Duration,
    pub paste_settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            element: Duration::from_secs(30),
            image_upload: Duration::from_secs(20),
            confirmation: Duration::from_secs(45),
            poll: Duration::from_millis(500),
            keystroke: Duration::from_millis(500),
            paste_settle: Duration::from_secs(1),
        }
    }
}

/// Everything site-specific about the publishing target: URLs, cookie names
/// and the selectors tried, in order, for each editor control.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: String,
    pub home_url: String,
    pub editor_url: String,
    pub cookie_domain: String,
    pub sid_cookie_name: String,
    pub uid_cookie_name: String,
    pub title_selectors: Vec<String>,
    pub body_selectors: Vec<String>,
    pub publish_dialog_selectors: Vec<String>,
    pub tag_input_selectors: Vec<String>,
    pub confirm_selectors: Vec<String>,
    pub editor_images_selector: String,
    /// URL fragments that mean the browser is still inside the editor.
    pub editor_url_markers: Vec<String>,
    pub timings: Timings,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SiteProfile {
    pub fn medium() -> Self {
        Self {
            name: "medium".to_string(),
            home_url: "https://medium.com/".to_string(),
            editor_url: "https://medium.com/new-story".to_string(),
            cookie_domain: ".medium.com".to_string(),
            sid_cookie_name: "sid".to_string(),
            uid_cookie_name: "uid".to_string(),
            title_selectors: owned(&[
                r#"h3[data-testid="editorTitleParagraph"]"#,
                r#"[data-testid="editorTitleParagraph"]"#,
                "h3.graf--title",
            ]),
            body_selectors: owned(&[
                r#"p[data-testid="editorParagraphText"]"#,
                r#"[data-testid="editorParagraphText"]"#,
                "p.graf--p",
            ]),
            publish_dialog_selectors: owned(&[
                r#"button[data-action="show-prepublish"]"#,
                r#"[data-testid="publishButton"]"#,
            ]),
            tag_input_selectors: owned(&[
                r#"div[data-testid="publishTopicsInput"]"#,
                r#"[data-testid="publishTopicsInput"] [contenteditable="true"]"#,
            ]),
            confirm_selectors: owned(&[
                r#"button[data-testid="publishConfirmButton"]"#,
                r#"[data-testid="publishConfirmButton"]"#,
            ]),
            editor_images_selector: r#"[contenteditable="true"] img"#.to_string(),
            editor_url_markers: owned(&["/new-story", "/edit"]),
            timings: Timings::default(),
        }
    }

    /// True once the URL has left every editor location.
    pub fn is_published_url(&self, url: &str) -> bool {
        !url.is_empty()
            && !url.starts_with("about:")
            && !self.editor_url_markers.iter().any(|m| url.contains(m.as_str()))
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::medium()
    }
}
