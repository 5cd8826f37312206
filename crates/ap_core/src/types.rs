use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item of an RSS/Atom feed, identified by its link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: Option<String>,
    /// Full HTML body, when the feed carries one (`content:encoded`, Atom `content`).
    pub content: Option<String>,
    pub media: Vec<MediaRef>,
    pub tags: Vec<String>,
    pub published: Option<DateTime<Utc>>,
}

impl FeedEntry {
    /// The richest HTML the feed offers for this entry.
    pub fn body_html(&self) -> &str {
        self.content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.summary.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Content,
    Thumbnail,
}

/// A media reference attached to a feed entry (media:content, media:thumbnail, enclosure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub mime_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub kind: MediaKind,
}

impl MediaRef {
    /// Thumbnails are images by definition; other media need an `image/*`
    /// type or, lacking one, an image file extension.
    pub fn is_image(&self) -> bool {
        if self.kind == MediaKind::Thumbnail {
            return true;
        }
        match self.mime_type.as_deref() {
            Some(mime) => mime.starts_with("image/"),
            None => looks_like_image_url(&self.url),
        }
    }
}

pub fn looks_like_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default().to_lowercase();
    [".jpg", ".jpeg", ".png", ".webp", ".gif", ".avif"]
        .iter()
        .any(|ext| path.ends_with(ext))
}

/// Article ready for publishing, possibly rewritten by a generative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedArticle {
    pub title: String,
    /// HTML body; may contain image placeholder tokens.
    pub html: String,
    pub tags: Vec<String>,
    pub alt_texts: Vec<String>,
    /// False when the original feed content is used verbatim.
    pub enriched: bool,
}

impl EnrichedArticle {
    pub fn from_entry(entry: &FeedEntry) -> Self {
        Self {
            title: entry.title.clone(),
            html: entry.body_html().to_string(),
            tags: entry.tags.clone(),
            alt_texts: Vec::new(),
            enriched: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageOrigin {
    FeedMetadata,
    InlineHtml,
    SourcePage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReference {
    pub url: String,
    pub alt: Option<String>,
    pub origin: ImageOrigin,
}

/// A piece of the editor body, pasted in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodySegment {
    Html(String),
    Image { url: String, alt: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub title: String,
    pub segments: Vec<BodySegment>,
    pub tags: Vec<String>,
    pub source_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub url: Option<String>,
    pub confirmed: bool,
    pub dry_run: bool,
}

/// One line of the publish stats log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub title: String,
    pub source_link: String,
    pub published_url: Option<String>,
    pub published_at: DateTime<Utc>,
}
