use chromiumoxide::error::CdpError;
use thiserror::Error;

use crate::wait::WaitTimeout;

pub type Result<T> = std::result::Result<T, PublishError>;

/// Failures inside the browser flow. Converted to `ap_core::Error::PublishFailed`
/// at the publisher boundary.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Browser protocol error: {0}")]
    Cdp(#[from] CdpError),

    #[error(transparent)]
    Timeout(#[from] WaitTimeout),

    #[error("Script result error: {0}")]
    Script(#[from] serde_json::Error),

    #[error("{0}")]
    Step(String),
}

impl From<PublishError> for ap_core::Error {
    fn from(err: PublishError) -> Self {
        ap_core::Error::PublishFailed(err.to_string())
    }
}
