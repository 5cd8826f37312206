use async_trait::async_trait;
use crate::types::{EnrichedArticle, FeedEntry};
use crate::Result;

#[async_trait]
pub trait ContentEnricher: Send + Sync + std::fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Rewrite an entry into a publishable article
    async fn enrich(&self, entry: &FeedEntry) -> Result<EnrichedArticle>;
}
