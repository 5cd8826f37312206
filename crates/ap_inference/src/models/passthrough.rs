use std::fmt;
use ap_core::{ContentEnricher, EnrichedArticle, FeedEntry, Result};

/// Publishes the feed content as-is. Used when no generator key is configured.
pub struct PassthroughModel;

impl fmt::Debug for PassthroughModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassthroughModel").finish()
    }
}

#[async_trait::async_trait]
impl ContentEnricher for PassthroughModel {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn enrich(&self, entry: &FeedEntry) -> Result<EnrichedArticle> {
        Ok(EnrichedArticle::from_entry(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_keeps_original() {
        let entry = FeedEntry {
            title: "Plain Soup".to_string(),
            link: "https://food.example.com/soup".to_string(),
            summary: Some("<p>Soup</p>".to_string()),
            tags: vec!["Soup".to_string()],
            ..Default::default()
        };
        let article = PassthroughModel.enrich(&entry).await.unwrap();
        assert_eq!(article.title, "Plain Soup");
        assert_eq!(article.html, "<p>Soup</p>");
        assert_eq!(article.tags, vec!["Soup"]);
        assert!(!article.enriched);
    }
}
