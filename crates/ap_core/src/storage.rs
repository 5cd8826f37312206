use std::collections::HashSet;
use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Returns true if the link was already published
    async fn contains(&self, link: &str) -> Result<bool>;

    /// Record a link as published
    async fn add(&self, link: &str) -> Result<()>;

    /// All published links
    async fn links(&self) -> Result<HashSet<String>>;
}
