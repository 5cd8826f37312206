use ap_core::{EnrichedArticle, Error, FeedEntry, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("valid fence regex"));

/// The JSON object the model is asked to return.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratedArticle {
    #[serde(default)]
    pub new_title: Option<String>,
    #[serde(default)]
    pub new_html_content: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub alt_texts: Vec<String>,
}

/// Models sometimes answer `"tags": "a, b"` instead of a list.
fn string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<Value>),
        Text(String),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Raw::Text(s) => s.split(',').map(|t| t.to_string()).collect(),
        Raw::Null => Vec::new(),
    })
}

impl GeneratedArticle {
    /// Merge with the original entry; absent or blank fields keep the original.
    pub fn into_article(self, entry: &FeedEntry) -> EnrichedArticle {
        let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().trim_start_matches('#').trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        EnrichedArticle {
            title: non_blank(self.new_title)
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| entry.title.clone()),
            html: non_blank(self.new_html_content).unwrap_or_else(|| entry.body_html().to_string()),
            tags: if tags.is_empty() { entry.tags.clone() } else { tags },
            alt_texts: self
                .alt_texts
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            enriched: true,
        }
    }
}

fn candidates(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    let mut out = vec![trimmed];
    out.extend(FENCE_RE.captures_iter(trimmed).filter_map(|c| c.get(1)).map(|m| m.as_str().trim()));
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            out.push(&trimmed[start..=end]);
        }
    }
    out
}

/// Extract the article object from free-form model output.
///
/// Accepts bare JSON, JSON inside a fenced code block, or JSON embedded in
/// prose. Output without a JSON object is an error, never an empty article.
pub fn parse_generated_article(text: &str) -> Result<GeneratedArticle> {
    for candidate in candidates(text) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
            return serde_json::from_value(value)
                .map_err(|e| Error::EnrichmentFailed(format!("Unexpected JSON shape: {}", e)));
        }
    }
    Err(Error::EnrichmentFailed("No JSON object found in model response".to_string()))
}
