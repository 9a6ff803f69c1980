use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::core::config::SearchSettings;
use crate::core::errors::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Snippet text; this is what gets merged into the synthetic document.
    pub content: String,
}

/// Seam for the web-search fallback so graph tests can run offline.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Provider-ordered results, capped at the configured max.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError>;
}

/// Dispatches to the configured provider; providers whose key is missing
/// fall back to keyless DuckDuckGo.
pub struct WebSearch {
    settings: SearchSettings,
    client: reqwest::Client,
}

impl WebSearch {
    pub fn new(settings: SearchSettings, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;
        Ok(Self { settings, client })
    }

    async fn tavily_search(&self, query: &str, api_key: &str) -> Result<Vec<SearchResult>, ApiError> {
        let body = json!({
            "api_key": api_key,
            "query": query,
            "max_results": self.settings.max_results,
        });

        let response = self
            .client
            .post("https://api.tavily.com/search")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !response.status().is_success() {
            return Err(ApiError::ServiceUnavailable(format!(
                "Tavily search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await.map_err(ApiError::internal)?;
        Ok(parse_tavily(&payload))
    }

    async fn brave_search(&self, query: &str, api_key: &str) -> Result<Vec<SearchResult>, ApiError> {
        let url = format!(
            "https://api.search.brave.com/res/v1/web/search?q={}&count={}",
            urlencoding::encode(query),
            self.settings.max_results
        );

        let response = self
            .client
            .get(url)
            .header("X-Subscription-Token", api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !response.status().is_success() {
            return Err(ApiError::ServiceUnavailable(format!(
                "Brave search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await.map_err(ApiError::internal)?;
        Ok(parse_brave(&payload))
    }

    async fn duckduckgo_search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let url = format!(
            "https://api.duckduckgo.com/?q={}&format=json&no_redirect=1&no_html=1",
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !response.status().is_success() {
            return Err(ApiError::ServiceUnavailable(format!(
                "DuckDuckGo search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await.map_err(ApiError::internal)?;
        Ok(parse_duckduckgo(&payload))
    }
}

#[async_trait]
impl SearchProvider for WebSearch {
    fn name(&self) -> &str {
        "web"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let mut results = match self.settings.provider.as_str() {
            "tavily" => match &self.settings.tavily_api_key {
                Some(key) if !key.is_empty() => self.tavily_search(query, key).await?,
                _ => {
                    tracing::warn!("tavily selected but no API key set, using DuckDuckGo");
                    self.duckduckgo_search(query).await?
                }
            },
            "brave" => match &self.settings.brave_api_key {
                Some(key) if !key.is_empty() => self.brave_search(query, key).await?,
                _ => {
                    tracing::warn!("brave selected but no API key set, using DuckDuckGo");
                    self.duckduckgo_search(query).await?
                }
            },
            _ => self.duckduckgo_search(query).await?,
        };

        results.truncate(self.settings.max_results.max(1));
        Ok(results)
    }
}

fn parse_tavily(payload: &Value) -> Vec<SearchResult> {
    let mut results = Vec::new();
    if let Some(items) = payload.get("results").and_then(|v| v.as_array()) {
        for item in items {
            let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let url = item.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let content = item.get("content").and_then(|v| v.as_str()).unwrap_or("");

            if !content.is_empty() {
                results.push(SearchResult {
                    title: title.to_string(),
                    url: url.to_string(),
                    content: content.to_string(),
                });
            }
        }
    }
    results
}

fn parse_brave(payload: &Value) -> Vec<SearchResult> {
    let mut results = Vec::new();
    if let Some(items) = payload
        .get("web")
        .and_then(|w| w.get("results"))
        .and_then(|v| v.as_array())
    {
        for item in items {
            let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let url = item.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let content = item
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("");

            if !title.is_empty() && !url.is_empty() {
                results.push(SearchResult {
                    title: title.to_string(),
                    url: url.to_string(),
                    content: content.to_string(),
                });
            }
        }
    }
    results
}

fn parse_duckduckgo(payload: &Value) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if let Some(abstract_text) = payload.get("AbstractText").and_then(|v| v.as_str()) {
        if let Some(url) = payload.get("AbstractURL").and_then(|v| v.as_str()) {
            if !abstract_text.is_empty() && !url.is_empty() {
                results.push(SearchResult {
                    title: abstract_text
                        .split(" - ")
                        .next()
                        .unwrap_or(abstract_text)
                        .to_string(),
                    url: url.to_string(),
                    content: abstract_text.to_string(),
                });
            }
        }
    }

    if let Some(items) = payload.get("Results").and_then(|v| v.as_array()) {
        extract_ddg_topics(items, &mut results);
    }
    if let Some(items) = payload.get("RelatedTopics").and_then(|v| v.as_array()) {
        extract_ddg_topics(items, &mut results);
    }

    results
}

fn extract_ddg_topics(items: &[Value], results: &mut Vec<SearchResult>) {
    for item in items {
        if let Some(topics) = item.get("Topics").and_then(|v| v.as_array()) {
            extract_ddg_topics(topics, results);
            continue;
        }
        let text = item.get("Text").and_then(|v| v.as_str()).unwrap_or("");
        let url = item.get("FirstURL").and_then(|v| v.as_str()).unwrap_or("");
        if text.is_empty() || url.is_empty() {
            continue;
        }
        results.push(SearchResult {
            title: text.split(" - ").next().unwrap_or(text).to_string(),
            url: url.to_string(),
            content: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tavily_payload_maps_content_field() {
        let payload = json!({
            "results": [
                { "title": "A", "url": "https://a.example", "content": "first snippet" },
                { "title": "B", "url": "https://b.example", "content": "" },
                { "title": "C", "url": "https://c.example", "content": "third snippet" }
            ]
        });

        let results = parse_tavily(&payload);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "first snippet");
        assert_eq!(results[1].content, "third snippet");
    }

    #[test]
    fn brave_payload_maps_description_to_content() {
        let payload = json!({
            "web": { "results": [
                { "title": "Page", "url": "https://x.example", "description": "about rust" }
            ]}
        });

        let results = parse_brave(&payload);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "about rust");
    }

    #[test]
    fn duckduckgo_payload_collects_abstract_and_nested_topics() {
        let payload = json!({
            "AbstractText": "Corrective retrieval - an overview",
            "AbstractURL": "https://d.example",
            "RelatedTopics": [
                { "Text": "Topic one - detail", "FirstURL": "https://t1.example" },
                { "Topics": [
                    { "Text": "Nested topic", "FirstURL": "https://t2.example" }
                ]}
            ]
        });

        let results = parse_duckduckgo(&payload);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Corrective retrieval");
        assert_eq!(results[2].content, "Nested topic");
    }

    #[test]
    fn empty_payloads_yield_no_results() {
        assert!(parse_tavily(&json!({})).is_empty());
        assert!(parse_brave(&json!({})).is_empty());
        assert!(parse_duckduckgo(&json!({})).is_empty());
    }
}
