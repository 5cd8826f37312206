use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use ap_core::{ContentEnricher, EnrichedArticle, Error, FeedEntry, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::parse::parse_generated_article;
use crate::prompt::rewrite_prompt;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);
const MAX_OUTPUT_TOKENS: u32 = 4096;
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>, model: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send one prompt and return the generated text.
    pub async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::EnrichmentFailed(format!("Request to {} failed: {}", self.model, e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EnrichmentFailed(format!(
                "{} returned HTTP {}: {}",
                self.model,
                status.as_u16(),
                body.chars().take(300).collect::<String>()
            )));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| Error::EnrichmentFailed(format!("Malformed response: {}", e.without_url())))?
            .text()
            .ok_or_else(|| Error::EnrichmentFailed("Response contained no generated text".to_string()))
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ContentEnricher for GeminiModel {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn enrich(&self, entry: &FeedEntry) -> Result<EnrichedArticle> {
        info!("💬 Asking {} to rewrite: {}", self.model, entry.title);
        let text = self.generate(rewrite_prompt(entry)).await?;
        debug!("Generated {} characters", text.len());
        let article = parse_generated_article(&text)?.into_article(entry);
        info!("✅ Received rewritten article: {}", article.title);
        Ok(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn entry() -> FeedEntry {
        FeedEntry {
            title: "Lemon Tart".to_string(),
            link: "https://food.example.com/lemon-tart".to_string(),
            summary: Some("<p>Tangy tart</p>".to_string()),
            ..Default::default()
        }
    }

    fn response_with_text(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_enrich_success() {
        let mut server = mockito::Server::new_async().await;
        let generated = "```json\n{\"new_title\": \"Zesty Lemon Tart\", \"new_html_content\": \"<p>Intro</p><!-- IMAGE 1 PLACEHOLDER -->\", \"tags\": [\"Baking\"], \"alt_texts\": [\"Tart\"]}\n```";
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "generationConfig": { "maxOutputTokens": 4096 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response_with_text(generated))
            .create_async()
            .await;

        let model = GeminiModel::new("test-key", "gemini-2.0-flash", &server.url()).unwrap();
        let article = model.enrich(&entry()).await.unwrap();
        mock.assert_async().await;

        assert_eq!(article.title, "Zesty Lemon Tart");
        assert!(article.html.contains("<!-- IMAGE 1 PLACEHOLDER -->"));
        assert_eq!(article.tags, vec!["Baking"]);
        assert_eq!(article.alt_texts, vec!["Tart"]);
        assert!(article.enriched);
    }

    #[tokio::test]
    async fn test_enrich_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let model = GeminiModel::new("test-key", "gemini-2.0-flash", &server.url()).unwrap();
        let err = model.enrich(&entry()).await.unwrap_err();
        assert!(matches!(err, Error::EnrichmentFailed(ref m) if m.contains("429")));
    }

    #[tokio::test]
    async fn test_enrich_without_json_in_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(response_with_text("Sorry, I can't do that."))
            .create_async()
            .await;

        let model = GeminiModel::new("test-key", "gemini-2.0-flash", &server.url()).unwrap();
        assert!(matches!(model.enrich(&entry()).await, Err(Error::EnrichmentFailed(_))));
    }

    #[tokio::test]
    async fn test_connection_error_does_not_reveal_key() {
        let model = GeminiModel::new("SUPER-SECRET-KEY", "gemini-2.0-flash", "http://127.0.0.1:1").unwrap();
        let err = model.enrich(&entry()).await.unwrap_err();
        assert!(matches!(err, Error::EnrichmentFailed(_)));
        assert!(!err.to_string().contains("SUPER-SECRET-KEY"));
        assert!(!format!("{:?}", err).contains("SUPER-SECRET-KEY"));
    }

    #[tokio::test]
    async fn test_enrich_empty_candidates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let model = GeminiModel::new("test-key", "gemini-2.0-flash", &server.url()).unwrap();
        assert!(matches!(model.enrich(&entry()).await, Err(Error::EnrichmentFailed(_))));
    }
}
