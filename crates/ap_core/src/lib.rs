pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod models;
pub mod placeholder;
pub mod publish;
pub mod storage;
pub mod types;

pub use config::{Config, GeneratorConfig, Secret, SiteCredentials};
pub use error::{Error, Result};
pub use feed::{FeedSource, ImageResolver};
pub use models::ContentEnricher;
pub use publish::Publisher;
pub use storage::LinkStore;
pub use types::{
    BodySegment, EnrichedArticle, FeedEntry, ImageOrigin, ImageReference, MediaKind, MediaRef,
    PublishOutcome, PublishRecord, PublishRequest,
};
