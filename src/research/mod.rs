//! 检索层：三个形态各异的外部检索服务，统一成 [`ResearchProvider`] 能力接口。
//!
//! - Wikipedia：百科检索，处理消歧义与缺页的多级兜底
//! - Serper：关键词网页搜索
//! - DuckDuckGo：开放的 Instant Answer 接口
//!
//! 所有实现都遵循同一个返回约定（[`ResearchResult`]），并且始终采用上游返回的第一条结果，不做重排。

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SearchConfig;

pub mod dispatch;
pub mod duckduckgo;
pub mod serper;
pub mod wikipedia;

pub use dispatch::{DispatchHandle, dispatch};
pub use duckduckgo::DuckDuckGoProvider;
pub use serper::SerperProvider;
pub use wikipedia::{EncyclopediaSource, LookupError, WikipediaApi, WikipediaProvider};

/// 检索引擎类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchEngine {
    #[serde(rename = "wikipedia")]
    #[default]
    Wikipedia,
    #[serde(rename = "serper")]
    Serper,
    #[serde(rename = "duckduckgo")]
    DuckDuckGo,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 3] = [
        SearchEngine::Wikipedia,
        SearchEngine::Serper,
        SearchEngine::DuckDuckGo,
    ];
}

impl std::fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchEngine::Wikipedia => write!(f, "Wikipedia"),
            SearchEngine::Serper => write!(f, "Serper"),
            SearchEngine::DuckDuckGo => write!(f, "DuckDuckGo"),
        }
    }
}

impl std::str::FromStr for SearchEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wikipedia" | "wiki" => Ok(SearchEngine::Wikipedia),
            "serper" | "google" => Ok(SearchEngine::Serper),
            "duckduckgo" | "ddg" => Ok(SearchEngine::DuckDuckGo),
            _ => Err(format!("Unknown search engine: {}", s)),
        }
    }
}

/// 一次检索的结果
///
/// 摘要与错误互斥：构造函数保证二者恰有其一。出错时不携带链接和图片。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    summary: Option<String>,
    links: Vec<String>,
    image_url: Option<String>,
    error: Option<String>,
    informational: bool,
}

impl ResearchResult {
    /// 检索到了资料
    pub fn found(summary: impl Into<String>, links: Vec<String>, image_url: Option<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            links,
            image_url: image_url.filter(|url| !url.trim().is_empty()),
            error: None,
            informational: false,
        }
    }

    /// 没有资料，但也不是错误：摘要是一条提示信息，流水线可以继续
    pub fn informational(message: impl Into<String>) -> Self {
        Self {
            summary: Some(message.into()),
            links: Vec::new(),
            image_url: None,
            error: None,
            informational: true,
        }
    }

    /// 检索失败
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            summary: None,
            links: Vec::new(),
            image_url: None,
            error: Some(error.into()),
            informational: false,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 摘要只是提示信息，没有实际调研内容
    pub fn is_informational(&self) -> bool {
        self.informational
    }

    /// 拆分为 (摘要, 链接, 图片)，出错时返回错误描述
    pub fn into_parts(self) -> Result<(String, Vec<String>, Option<String>), String> {
        match (self.summary, self.error) {
            (_, Some(error)) => Err(error),
            (Some(summary), None) => Ok((summary, self.links, self.image_url)),
            (None, None) => Err("research returned neither a summary nor an error".to_string()),
        }
    }
}

/// 检索能力接口
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// 提供方名称，用于日志
    fn name(&self) -> &'static str;

    /// 检索主题。所有失败都折叠进 [`ResearchResult`]，不会返回 `Err`
    async fn search(&self, topic: &str) -> ResearchResult;
}

/// 构造检索使用的 HTTP 客户端
pub fn build_http_client(config: &SearchConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
    if let Some(seconds) = config.request_timeout_seconds {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    builder.build().context("Failed to build HTTP client")
}

/// 根据配置的检索引擎构造提供方
pub fn build_provider(
    engine: SearchEngine,
    config: &SearchConfig,
) -> Result<Arc<dyn ResearchProvider>> {
    let client = build_http_client(config)?;
    let provider: Arc<dyn ResearchProvider> = match engine {
        SearchEngine::Wikipedia => Arc::new(WikipediaProvider::new(
            WikipediaApi::new(client, config),
        )),
        SearchEngine::Serper => Arc::new(SerperProvider::new(client, config)),
        SearchEngine::DuckDuckGo => Arc::new(DuckDuckGoProvider::new(client, config)),
    };
    Ok(provider)
}

/// 按检索引擎登记的提供方，每次运行按请求中的引擎取用
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<SearchEngine, Arc<dyn ResearchProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为所有检索引擎构造提供方，共用一套配置
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let mut registry = Self::new();
        for engine in SearchEngine::ALL {
            registry = registry.register(engine, build_provider(engine, config)?);
        }
        Ok(registry)
    }

    pub fn register(mut self, engine: SearchEngine, provider: Arc<dyn ResearchProvider>) -> Self {
        self.providers.insert(engine, provider);
        self
    }

    pub fn get(&self, engine: SearchEngine) -> Option<Arc<dyn ResearchProvider>> {
        self.providers.get(&engine).cloned()
    }
}
