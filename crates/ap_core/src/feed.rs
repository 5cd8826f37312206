use async_trait::async_trait;
use crate::types::{FeedEntry, ImageReference};
use crate::Result;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human readable location of the feed
    fn location(&self) -> &str;

    /// Fetch entries ordered oldest to newest
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>>;
}

#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Best-effort list of representative images, most preferred first
    async fn resolve(&self, entry: &FeedEntry) -> Result<Vec<ImageReference>>;
}
