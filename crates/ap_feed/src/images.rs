use std::collections::HashSet;
use std::time::Duration;
use async_trait::async_trait;
use ap_core::{FeedEntry, ImageOrigin, ImageReference, ImageResolver, MediaKind, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::reader::USER_AGENT;

/// Images narrower or shorter than this are treated as decoration.
pub const MIN_IMAGE_DIMENSION: u32 = 150;

/// URL tokens that mark site chrome rather than article images.
pub const EXCLUDED_KEYWORDS: &[&str] = &[
    "logo", "icon", "avatar", "gravatar", "favicon", "sprite", "emoji", "badge", "pixel",
    "spinner", "placeholder", "spacer", "loading", "blank",
];

const PAGE_TIMEOUT: Duration = Duration::from_secs(20);

static INLINE_IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"'>]+)["']"#).expect("valid img regex"));

static SIZE_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[?&](?:w|width|h|height|resize|size|sz)=(\d+)").expect("valid size param regex")
});

static SIZE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[-_](\d{1,4})x(\d{1,4})\.(?:jpe?g|png|webp|gif|avif)").expect("valid size suffix regex")
});

static CDN_SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[/,])[wh]_(\d+)(?:[,/]|$)").expect("valid cdn size regex"));

static BACKGROUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:[^;]*url\(\s*['"]?([^'")]+)['"]?\s*\)"#).expect("valid background regex")
});

/// An image URL with whatever size hints its source exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Candidate {
    fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
        }
    }

    pub fn is_acceptable(&self) -> bool {
        let too_small = |d: Option<u32>| d.is_some_and(|d| d < MIN_IMAGE_DIMENSION);
        !too_small(self.width) && !too_small(self.height) && is_probably_content_image(&self.url)
    }
}

/// Heuristic filter for article images: rejects inline data, vector icons,
/// chrome keywords, and URLs advertising a tiny rendition.
pub fn is_probably_content_image(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || url.starts_with("data:") {
        return false;
    }
    let lower = url.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    if path.ends_with(".svg") || path.ends_with(".ico") {
        return false;
    }
    if has_excluded_keyword(&lower) {
        return false;
    }
    !matches!(dimension_hint(&lower), Some(d) if d < MIN_IMAGE_DIMENSION)
}

fn has_excluded_keyword(url: &str) -> bool {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let location = without_scheme.split(['?', '#']).next().unwrap_or_default();
    location
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| EXCLUDED_KEYWORDS.iter().any(|kw| token.starts_with(kw)))
}

/// Smallest pixel dimension a URL advertises, if any.
pub fn dimension_hint(url: &str) -> Option<u32> {
    let params = SIZE_PARAM_RE
        .captures_iter(url)
        .filter_map(|c| c[1].parse::<u32>().ok());
    let suffixes = SIZE_SUFFIX_RE.captures_iter(url).flat_map(|c| {
        [c[1].parse::<u32>().ok(), c[2].parse::<u32>().ok()]
            .into_iter()
            .flatten()
    });
    let cdn = CDN_SIZE_RE
        .captures_iter(url)
        .filter_map(|c| c[1].parse::<u32>().ok());
    params.chain(suffixes).chain(cdn).filter(|d| *d > 0).min()
}

/// `<img src>` values in an HTML fragment, in document order.
pub fn inline_image_urls(html: &str) -> Vec<String> {
    INLINE_IMG_RE
        .captures_iter(html)
        .map(|c| c[1].trim().to_string())
        .collect()
}

/// Image candidates found in a rendered article page.
pub fn page_image_candidates(html: &str, base: &Url) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();
    let resolve = |raw: &str| -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with("data:") {
            return None;
        }
        base.join(raw).ok().map(|u| u.to_string())
    };

    if let Ok(meta) = Selector::parse("meta[property='og:image'], meta[name='twitter:image']") {
        for el in document.select(&meta) {
            if let Some(url) = el.value().attr("content").and_then(resolve) {
                candidates.push(Candidate::bare(url));
            }
        }
    }

    if let Ok(img) = Selector::parse("img") {
        for el in document.select(&img) {
            let attrs = el.value();
            let raw = ["data-src", "data-lazy-src", "data-original", "src"]
                .iter()
                .find_map(|name| attrs.attr(name).filter(|v| !v.trim().is_empty() && !v.starts_with("data:")))
                .or_else(|| attrs.attr("srcset").and_then(largest_srcset_entry));
            if let Some(url) = raw.and_then(resolve) {
                candidates.push(Candidate {
                    url,
                    width: attrs.attr("width").and_then(parse_dimension),
                    height: attrs.attr("height").and_then(parse_dimension),
                });
            }
        }
    }

    if let Ok(source) = Selector::parse("picture source[srcset], source[srcset]") {
        for el in document.select(&source) {
            if let Some(url) = el.value().attr("srcset").and_then(largest_srcset_entry).and_then(resolve) {
                candidates.push(Candidate::bare(url));
            }
        }
    }

    if let Ok(styled) = Selector::parse("[style]") {
        for el in document.select(&styled) {
            if let Some(style) = el.value().attr("style") {
                for cap in BACKGROUND_RE.captures_iter(style) {
                    if let Some(url) = resolve(&cap[1]) {
                        candidates.push(Candidate::bare(url));
                    }
                }
            }
        }
    }

    candidates
}

/// The last (conventionally widest) URL of a `srcset` attribute.
fn largest_srcset_entry(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .filter_map(|part| part.split_whitespace().next())
        .last()
}

fn parse_dimension(raw: &str) -> Option<u32> {
    raw.trim().trim_end_matches("px").parse().ok()
}

/// Keep acceptable candidates, drop duplicates, cap the count.
pub fn select_images(candidates: Vec<(Candidate, ImageOrigin)>, limit: usize) -> Vec<ImageReference> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|(c, _)| c.is_acceptable())
        .filter(|(c, _)| seen.insert(c.url.clone()))
        .take(limit)
        .map(|(c, origin)| ImageReference {
            url: c.url,
            alt: None,
            origin,
        })
        .collect()
}

/// Feed media content first, then thumbnails, then `<img>` tags in the body.
fn entry_candidates(entry: &FeedEntry) -> Vec<(Candidate, ImageOrigin)> {
    let media_of = |kind: MediaKind| {
        entry
            .media
            .iter()
            .filter(move |m| m.kind == kind && m.is_image())
            .map(|m| {
                (
                    Candidate {
                        url: m.url.clone(),
                        width: m.width,
                        height: m.height,
                    },
                    ImageOrigin::FeedMetadata,
                )
            })
    };
    let mut candidates: Vec<(Candidate, ImageOrigin)> = media_of(MediaKind::Content)
        .chain(media_of(MediaKind::Thumbnail))
        .collect();

    let base = Url::parse(&entry.link).ok();
    for raw in inline_image_urls(entry.body_html()) {
        let url = match &base {
            Some(base) => base.join(&raw).map(|u| u.to_string()).unwrap_or(raw),
            None => raw,
        };
        candidates.push((Candidate::bare(url), ImageOrigin::InlineHtml));
    }
    candidates
}

/// Finds images in feed metadata and, optionally, on the source article page.
#[derive(Debug, Clone)]
pub struct FeedImageResolver {
    client: Option<Client>,
    max_images: usize,
}

impl FeedImageResolver {
    /// Metadata only; never touches the network.
    pub fn metadata_only(max_images: usize) -> Self {
        Self {
            client: None,
            max_images,
        }
    }

    /// Metadata first, then the source page when more images are wanted.
    pub fn with_page_scraping(max_images: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(PAGE_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client: Some(client),
            max_images,
        })
    }

    async fn fetch_page_candidates(&self, client: &Client, link: &str) -> Result<Vec<Candidate>> {
        let base = Url::parse(link).map_err(|e| ap_core::Error::InvalidUrl(format!("{}: {}", link, e)))?;
        let html = client.get(link).send().await?.error_for_status()?.text().await?;
        Ok(page_image_candidates(&html, &base))
    }
}

#[async_trait]
impl ImageResolver for FeedImageResolver {
    async fn resolve(&self, entry: &FeedEntry) -> Result<Vec<ImageReference>> {
        let mut candidates = entry_candidates(entry);

        let from_metadata = select_images(candidates.clone(), self.max_images);
        if let Some(client) = self.client.as_ref().filter(|_| from_metadata.len() < self.max_images) {
            debug!("Looking for more images on {}", entry.link);
            match self.fetch_page_candidates(client, &entry.link).await {
                Ok(found) => {
                    candidates.extend(found.into_iter().map(|c| (c, ImageOrigin::SourcePage)));
                }
                Err(e) => warn!("⚠️ Could not scrape images from {}: {}", entry.link, e),
            }
        }

        let images = select_images(candidates, self.max_images);
        match images.first() {
            Some(first) => info!("🖼️ Found {} image(s), first: {}", images.len(), first.url),
            None => info!("⚠️ No usable image found for {}", entry.link),
        }
        Ok(images)
    }
}
