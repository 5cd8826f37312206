use std::fmt;
use std::path::PathBuf;
use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_POSTED_LINKS_FILE: &str = "posted_links.txt";
pub const DEFAULT_MAX_TAGS: usize = 5;
pub const DEFAULT_MAX_IMAGES: usize = 2;

/// A string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    fn non_empty(value: &Option<Secret>) -> Option<String> {
        value
            .as_ref()
            .map(|s| s.0.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Settings for the generative text endpoint.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<Secret>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<String> {
        Secret::non_empty(&self.api_key)
    }
}

/// The two session cookie values that authenticate the browser on the publishing site.
#[derive(Clone)]
pub struct SiteCredentials {
    pub sid: String,
    pub uid: String,
}

impl fmt::Debug for SiteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteCredentials")
            .field("sid", &"<redacted>")
            .field("uid", &"<redacted>")
            .finish()
    }
}

/// Run configuration, built once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub generator: GeneratorConfig,
    pub sid_cookie: Option<Secret>,
    pub uid_cookie: Option<Secret>,
    pub posted_links_path: PathBuf,
    pub stats_path: Option<PathBuf>,
    pub debug_dir: PathBuf,
    pub test_mode: bool,
    pub scrape_source_pages: bool,
    pub max_tags: usize,
    pub max_images: usize,
    pub chrome_path: Option<PathBuf>,
}

impl Config {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            generator: GeneratorConfig::default(),
            sid_cookie: None,
            uid_cookie: None,
            posted_links_path: PathBuf::from(DEFAULT_POSTED_LINKS_FILE),
            stats_path: None,
            debug_dir: PathBuf::from("."),
            test_mode: false,
            scrape_source_pages: false,
            max_tags: DEFAULT_MAX_TAGS,
            max_images: DEFAULT_MAX_IMAGES,
            chrome_path: None,
        }
    }

    /// Session cookies for the publishing site, or `MissingCredentials` if either is unset.
    pub fn credentials(&self) -> Result<SiteCredentials> {
        match (Secret::non_empty(&self.sid_cookie), Secret::non_empty(&self.uid_cookie)) {
            (Some(sid), Some(uid)) => Ok(SiteCredentials { sid, uid }),
            (None, _) => Err(Error::MissingCredentials("sid session cookie is not set".to_string())),
            (_, None) => Err(Error::MissingCredentials("uid session cookie is not set".to_string())),
        }
    }

    pub fn has_generator_key(&self) -> bool {
        self.generator.api_key().is_some()
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.feed_url)
            .map_err(|e| Error::Config(format!("invalid feed URL {}: {}", self.feed_url, e)))?;
        if self.max_images > 2 {
            return Err(Error::Config("at most two images can be placed in an article".to_string()));
        }
        Ok(())
    }
}
