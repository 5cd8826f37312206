pub mod models;
pub mod parse;
pub mod prompt;

pub use models::create_enricher;
pub use parse::{parse_generated_article, GeneratedArticle};

pub mod prelude {
    pub use super::models::{create_enricher, GeminiModel, PassthroughModel};
    pub use super::parse::parse_generated_article;
    pub use ap_core::{ContentEnricher, EnrichedArticle, Error, FeedEntry, Result};
}
