//! Seeds the registry from a provider's model listing.
//!
//! OpenRouter's `GET /api/v1/models` reports a `context_length` for every
//! model it routes. Fetching it once at startup means budgets are right
//! from the first request instead of after the first response.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info};

use crate::registry::ContextWindowRegistry;

pub const OPENROUTER_MODELS_URL: &str = "https://openrouter.ai/api/v1/models";

/// One model from the listing.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogModel {
    pub id: String,
    #[serde(default)]
    pub context_length: Option<f64>,
    #[serde(default)]
    top_provider: Option<TopProvider>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
struct TopProvider {
    #[serde(default)]
    context_length: Option<f64>,
}

impl CatalogModel {
    pub fn new(id: impl Into<String>, context_length: Option<f64>) -> Self {
        Self {
            id: id.into(),
            context_length,
            top_provider: None,
        }
    }

    /// The model's context window: the top-level field, else the top
    /// provider's.
    pub fn context_window(&self) -> Option<f64> {
        self.context_length
            .or_else(|| self.top_provider.as_ref().and_then(|p| p.context_length))
    }
}

#[derive(Deserialize, Debug)]
struct RawCatalog {
    data: Vec<CatalogModel>,
}

/// Parse a `{ "data": [...] }` model listing.
pub fn parse_catalog(body: &str) -> Result<Vec<CatalogModel>, String> {
    let raw: RawCatalog =
        serde_json::from_str(body).map_err(|e| format!("failed to parse model catalog: {e}"))?;
    Ok(raw.data)
}

/// Record every catalog model that carries a context window. Returns how
/// many did.
pub fn seed_registry(registry: &ContextWindowRegistry, models: &[CatalogModel]) -> usize {
    let mut seeded = 0;
    for model in models {
        if let Some(window) = model.context_window() {
            registry.record(&model.id, window);
            seeded += 1;
        }
    }
    info!("seeded {seeded} of {} catalog models", models.len());
    seeded
}

/// Async HTTP client for a model listing endpoint.
pub struct CatalogClient {
    client: reqwest::Client,
    url: String,
}

impl CatalogClient {
    /// Client for the public OpenRouter listing.
    pub fn new() -> Result<Self, String> {
        Self::with_url(OPENROUTER_MODELS_URL)
    }

    /// Client for any endpoint serving the same listing shape.
    pub fn with_url(url: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("ctxwin/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the listing.
    pub async fn fetch(&self) -> Result<Vec<CatalogModel>, String> {
        let start = Instant::now();
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;
        debug!(
            "model catalog: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("model catalog HTTP {status}: {text}"));
        }
        parse_catalog(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "data": [
            { "id": "anthropic/claude-sonnet-4", "context_length": 200000 },
            { "id": "openai/gpt-4o", "context_length": null,
              "top_provider": { "context_length": 128000, "max_completion_tokens": 16384 } },
            { "id": "mystery/model", "pricing": { "prompt": "0" } }
        ]
    }"#;

    #[test]
    fn parses_listing() {
        let models = parse_catalog(LISTING).unwrap();
        assert_eq!(models.len(), 3);
        assert_eq!(models[0].context_window(), Some(200_000.0));
        assert_eq!(models[1].context_window(), Some(128_000.0));
        assert_eq!(models[2].context_window(), None);
    }

    #[test]
    fn seeds_only_models_with_windows() {
        let registry = ContextWindowRegistry::new();
        let models = parse_catalog(LISTING).unwrap();
        assert_eq!(seed_registry(&registry, &models), 2);
        assert_eq!(registry.lookup("Anthropic/Claude-Sonnet-4"), Some(200_000));
        assert_eq!(registry.lookup("openai/gpt-4o"), Some(128_000));
        assert_eq!(registry.lookup("mystery/model"), None);
    }

    #[test]
    fn seeds_constructed_models() {
        let registry = ContextWindowRegistry::new();
        let models = vec![
            CatalogModel::new("Local/Llama-3", Some(8192.5)),
            CatalogModel::new("local/unsized", None),
            CatalogModel::new("broken", Some(-1.0)),
        ];
        // Counts models carrying a value; the registry still drops the invalid one.
        assert_eq!(seed_registry(&registry, &models), 2);
        assert_eq!(registry.lookup("local/llama-3"), Some(8192));
        assert_eq!(registry.lookup("broken"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_wrong_shape() {
        let err = parse_catalog(r#"{"models": []}"#).unwrap_err();
        assert!(err.contains("failed to parse model catalog"));
    }

    #[test]
    fn client_keeps_custom_url() {
        let client = CatalogClient::with_url("http://127.0.0.1:9/models").unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:9/models");
    }
}
