use std::sync::Arc;
use ap_core::{ContentEnricher, GeneratorConfig, Result};
use tracing::info;

pub mod gemini;
pub mod passthrough;

pub use gemini::GeminiModel;
pub use passthrough::PassthroughModel;

/// Gemini when a key is configured, otherwise the passthrough model, which
/// never touches the network.
pub fn create_enricher(config: &GeneratorConfig) -> Result<Arc<dyn ContentEnricher>> {
    match config.api_key() {
        Some(key) => {
            let model = GeminiModel::new(key, &config.model, &config.base_url)?;
            info!("🧠 Content enrichment enabled (using {})", config.model);
            Ok(Arc::new(model))
        }
        None => {
            info!("⚠️ No generator API key configured, publishing original content");
            Ok(Arc::new(PassthroughModel))
        }
    }
}
