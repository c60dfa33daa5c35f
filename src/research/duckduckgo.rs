//! DuckDuckGo Instant Answer 检索

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::config::SearchConfig;
use crate::research::{ResearchProvider, ResearchResult};

const DUCKDUCKGO_ORIGIN: &str = "https://duckduckgo.com";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    image: String,
}

pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            endpoint: config.duckduckgo_endpoint.clone(),
        }
    }

    async fn query(&self, topic: &str) -> Result<InstantAnswer, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", topic), ("format", "json"), ("no_html", "1")])
            .send()
            .await
            .map_err(|e| format!("Error: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Error: DuckDuckGo returned status {}", status.as_u16()));
        }

        // 接口返回的 content-type 不一定是 application/json，按文本读取后再解析
        let body = response.text().await.map_err(|e| format!("Error: {}", e))?;
        serde_json::from_str(&body).map_err(|e| format!("Error: {}", e))
    }
}

/// 图片地址可能是站内相对路径
fn absolute_image_url(image: &str) -> Option<String> {
    let image = image.trim();
    if image.is_empty() {
        None
    } else if image.starts_with('/') {
        Some(format!("{}{}", DUCKDUCKGO_ORIGIN, image))
    } else {
        Some(image.to_string())
    }
}

#[async_trait]
impl ResearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    #[instrument(name = "research.duckduckgo", skip(self))]
    async fn search(&self, topic: &str) -> ResearchResult {
        match self.query(topic).await {
            Ok(answer) => {
                let links = if answer.abstract_url.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![answer.abstract_url]
                };
                ResearchResult::found(
                    answer.abstract_text.trim(),
                    links,
                    absolute_image_url(&answer.image),
                )
            }
            Err(error) => {
                warn!(topic, %error, "duckduckgo search failed");
                ResearchResult::failed(error)
            }
        }
    }
}
