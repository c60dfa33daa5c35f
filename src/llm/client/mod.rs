//! LLM客户端 - 提供统一的文本生成接口

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::{config::LLMConfig, llm::client::utils::evaluate_befitting_model};

mod providers;
pub mod utils;

use providers::ProviderClient;

/// 文本生成能力接口
///
/// 每次调用都是独立的单轮请求：一段系统提示词加一段用户提示词，返回模型的原始文本。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// LLM客户端 - 基于rig的多Provider实现
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        info!(provider = %self.config.provider, "checking model connection");
        self.generate("You are a helpful assistant.", "Hello")
            .await
            .map(|_| ())
            .map_err(|e| anyhow!("model connection failed: {}", e))
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let model = evaluate_befitting_model(&self.config, system_prompt, user_prompt);
        debug!(
            model = %model,
            prompt_chars = system_prompt.len() + user_prompt.len(),
            "sending prompt"
        );

        let agent = self
            .client
            .create_agent(&model, system_prompt, &self.config)?;
        agent.prompt(user_prompt).await
    }
}
