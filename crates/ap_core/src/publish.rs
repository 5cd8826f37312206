use async_trait::async_trait;
use crate::types::{PublishOutcome, PublishRequest};
use crate::Result;

#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &str;

    /// Submit an article. Side effects are irreversible unless running dry.
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome>;
}
