use futures::future::BoxFuture;
use serde_json::json;
use tracing::debug;

use scout_core::config::SearchConfig;
use scout_core::error::{Result, ScoutError};
use scout_core::traits::WebSearchProvider;
use scout_core::types::{SearchEngine, SerpResults};

const PROVIDER: &str = "serp";

/// Bright Data SERP API client.
pub struct BrightDataSerp {
    api_url: String,
    api_key: String,
    zone: String,
    http: reqwest::Client,
}

impl BrightDataSerp {
    pub fn new(api_url: &str, api_key: &str, zone: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            zone: zone.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let api_url = config
            .api_url
            .as_deref()
            .ok_or_else(|| ScoutError::Config("search.api_url is not set".into()))?;
        let api_key = config.api_key.as_deref().unwrap_or_default();
        Ok(Self::new(api_url, api_key, &config.zone))
    }
}

/// Form-style query encoding: spaces become `+`, a literal `+` becomes `%2B`.
fn encode_query(query: &str) -> String {
    urlencoding::encode(query).replace("%20", "+")
}

/// Body of a SERP request: the engine's search page for `query`, asking the
/// proxy for parsed JSON.
fn serp_request_body(zone: &str, query: &str, engine: SearchEngine) -> serde_json::Value {
    json!({
        "zone": zone,
        "url": format!(
            "{}{}&brd_json=1",
            engine.search_url_prefix(),
            encode_query(query)
        ),
        "format": "raw",
    })
}

/// Keep only the knowledge panel and organic results.
fn extract_results(body: &serde_json::Value) -> Option<SerpResults> {
    let obj = body.as_object()?;
    Some(SerpResults {
        knowledge: obj.get("knowledge").cloned().unwrap_or_else(|| json!({})),
        organic: obj.get("organic").cloned().unwrap_or_else(|| json!({})),
    })
}

impl WebSearchProvider for BrightDataSerp {
    fn search<'a>(
        &'a self,
        query: &'a str,
        engine: SearchEngine,
    ) -> BoxFuture<'a, Result<Option<SerpResults>>> {
        Box::pin(async move {
            debug!(engine = %engine, query, "Submitting SERP request");

            let resp = self
                .http
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&serp_request_body(&self.zone, query, engine))
                .send()
                .await
                .map_err(|e| ScoutError::ProviderRequest {
                    provider: PROVIDER.into(),
                    message: e.to_string(),
                })?;

            if !resp.status().is_success() {
                return Err(ScoutError::ProviderRequest {
                    provider: PROVIDER.into(),
                    message: format!("HTTP {} from {} search", resp.status(), engine),
                });
            }

            let body: serde_json::Value =
                resp.json().await.map_err(|e| ScoutError::ProviderResponse {
                    provider: PROVIDER.into(),
                    message: e.to_string(),
                })?;

            Ok(extract_results(&body))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_encoding_is_form_style() {
        assert_eq!(encode_query("c++ vs rust"), "c%2B%2B+vs+rust");
        assert_eq!(encode_query("a/b?"), "a%2Fb%3F");
    }

    #[test]
    fn test_request_body_encodes_query() {
        let body = serp_request_body("zone_a", "rust async & tokio", SearchEngine::Bing);
        assert_eq!(body["zone"], "zone_a");
        assert_eq!(body["format"], "raw");
        assert_eq!(
            body["url"],
            "https://www.bing.com/search?q=rust+async+%26+tokio&brd_json=1"
        );
    }

    #[test]
    fn test_yandex_uses_text_param() {
        let body = serp_request_body("z", "q", SearchEngine::Yandex);
        assert_eq!(body["url"], "https://yandex.com/search?text=q&brd_json=1");
    }

    #[test]
    fn test_extract_results_keeps_two_sections() {
        let body = json!({
            "knowledge": {"title": "Rust"},
            "organic": [{"link": "https://rust-lang.org"}],
            "pagination": {"next": 2}
        });
        let results = extract_results(&body).unwrap();
        assert_eq!(results.knowledge, json!({"title": "Rust"}));
        assert_eq!(results.organic, json!([{"link": "https://rust-lang.org"}]));
    }

    #[test]
    fn test_extract_results_defaults_missing_sections() {
        let results = extract_results(&json!({})).unwrap();
        assert_eq!(results.knowledge, json!({}));
        assert_eq!(results.organic, json!({}));
        assert!(extract_results(&json!("not an object")).is_none());
    }

    #[test]
    fn test_from_config_requires_url() {
        let config = SearchConfig::default();
        assert!(matches!(
            BrightDataSerp::from_config(&config),
            Err(ScoutError::Config(_))
        ));
    }
}
