use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Enrichment failed: {0}")]
    EnrichmentFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Errors that mean "nothing to publish this run" rather than a failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, Error::FeedUnavailable(_) | Error::MissingCredentials(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_errors() {
        assert!(Error::FeedUnavailable("empty".to_string()).is_benign());
        assert!(Error::MissingCredentials("sid".to_string()).is_benign());
        assert!(!Error::PublishFailed("button".to_string()).is_benign());
        assert!(!Error::EnrichmentFailed("no json".to_string()).is_benign());
    }

    #[test]
    fn test_display() {
        let err = Error::PublishFailed("confirm button not found".to_string());
        assert_eq!(err.to_string(), "Publish failed: confirm button not found");
    }
}
