//! Serper 网页搜索

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::config::SearchConfig;
use crate::research::{ResearchProvider, ResearchResult};

/// 参考链接最多取前几条搜索结果
const MAX_LINKS: usize = 3;

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    gl: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganicResult {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

pub struct SerperProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    region: String,
}

impl SerperProvider {
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            endpoint: config.serper_endpoint.clone(),
            api_key: config.serper_api_key.clone(),
            region: config.serper_region.clone(),
        }
    }

    async fn query(&self, topic: &str) -> Result<SerperResponse, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: topic,
                gl: &self.region,
            })
            .send()
            .await
            .map_err(|e| format!("Error: {}", e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(format!(
                "Error: Serper rejected the API key (status {})",
                response.status().as_u16()
            )),
            status if !status.is_success() => {
                Err(format!("Error: Serper returned status {}", status.as_u16()))
            }
            _ => response
                .json::<SerperResponse>()
                .await
                .map_err(|e| format!("Error: {}", e)),
        }
    }
}

#[async_trait]
impl ResearchProvider for SerperProvider {
    fn name(&self) -> &'static str {
        "serper"
    }

    #[instrument(name = "research.serper", skip(self))]
    async fn search(&self, topic: &str) -> ResearchResult {
        let response = match self.query(topic).await {
            Ok(response) => response,
            Err(error) => {
                warn!(topic, %error, "serper search failed");
                return ResearchResult::failed(error);
            }
        };

        let Some(first) = response.organic.first() else {
            return ResearchResult::informational("No results found.");
        };

        let summary = first
            .snippet
            .clone()
            .filter(|snippet| !snippet.trim().is_empty())
            .unwrap_or_else(|| "No summary available.".to_string());
        let image_url = first.image_url.clone();
        let links = response
            .organic
            .iter()
            .take(MAX_LINKS)
            .filter_map(|result| result.link.clone())
            .collect();

        ResearchResult::found(summary, links, image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> SerperProvider {
        let config = SearchConfig {
            serper_api_key: "test-key".to_string(),
            serper_endpoint: format!("{}/search", server.uri()),
            serper_region: "in".to_string(),
            ..Default::default()
        };
        SerperProvider::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn test_search_takes_first_snippet_and_three_links() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "test-key"))
            .and(body_json(serde_json::json!({"q": "rust ownership", "gl": "in"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [
                    {"title": "A", "link": "https://a.example", "snippet": "First snippet", "imageUrl": "https://a.example/img.png"},
                    {"title": "B", "link": "https://b.example", "snippet": "Second"},
                    {"title": "C", "link": "https://c.example", "snippet": "Third"},
                    {"title": "D", "link": "https://d.example", "snippet": "Fourth"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = provider_for(&server).search("rust ownership").await;

        assert_eq!(result.summary(), Some("First snippet"));
        assert_eq!(
            result.links(),
            [
                "https://a.example".to_string(),
                "https://b.example".to_string(),
                "https://c.example".to_string()
            ]
        );
        assert_eq!(result.image_url(), Some("https://a.example/img.png"));
    }

    #[tokio::test]
    async fn test_search_without_snippet_uses_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [{"title": "A", "link": "https://a.example"}]
            })))
            .mount(&server)
            .await;

        let result = provider_for(&server).search("anything").await;

        assert_eq!(result.summary(), Some("No summary available."));
        assert!(result.image_url().is_none());
    }

    #[tokio::test]
    async fn test_search_without_results_is_informational() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": []
            })))
            .mount(&server)
            .await;

        let result = provider_for(&server).search("qwertyuiop asdf").await;

        assert_eq!(result.summary(), Some("No results found."));
        assert!(result.links().is_empty());
        assert!(result.is_informational());
    }

    #[tokio::test]
    async fn test_rejected_key_mentions_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = provider_for(&server).search("anything").await;

        let error = result.error().unwrap();
        assert!(error.starts_with("Error: "));
        assert!(error.contains("API key"));
        assert!(result.summary().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = provider_for(&server).search("anything").await;
        assert_eq!(result.error(), Some("Error: Serper returned status 500"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = provider_for(&server).search("anything").await;
        assert!(result.error().unwrap().starts_with("Error: "));
    }
}
