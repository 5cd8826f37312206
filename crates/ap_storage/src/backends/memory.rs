use std::collections::HashSet;
use async_trait::async_trait;
use ap_core::{LinkStore, Result};
use tokio::sync::RwLock;

/// Published links kept for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    links: RwLock<HashSet<String>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            links: RwLock::new(links.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn contains(&self, link: &str) -> Result<bool> {
        Ok(self.links.read().await.contains(link.trim()))
    }

    async fn add(&self, link: &str) -> Result<()> {
        self.links.write().await.insert(link.trim().to_string());
        Ok(())
    }

    async fn links(&self) -> Result<HashSet<String>> {
        Ok(self.links.read().await.clone())
    }
}
