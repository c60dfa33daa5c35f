use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::Config, generator::state::PipelineState, llm::client::TextGenerator,
    memory::SessionMemory, research::ProviderRegistry,
};

#[derive(Clone)]
pub struct GeneratorContext {
    /// 文本生成器，用于与AI通信。
    pub generator: Arc<dyn TextGenerator>,
    /// 各检索引擎的提供方
    pub providers: ProviderRegistry,
    /// 配置
    pub config: Config,
    /// 会话存储
    pub session: Arc<RwLock<SessionMemory>>,
}

impl GeneratorContext {
    /// 使用现成的生成器与检索提供方组装上下文
    pub fn with_parts(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        providers: ProviderRegistry,
    ) -> Self {
        Self {
            generator,
            providers,
            config,
            session: Arc::new(RwLock::new(SessionMemory::new())),
        }
    }

    /// 提交一次运行的结果
    pub async fn commit(&self, state: PipelineState) -> Arc<PipelineState> {
        let mut session = self.session.write().await;
        session.commit(state)
    }

    /// 最近一次提交的结果
    pub async fn latest(&self) -> Option<Arc<PipelineState>> {
        let session = self.session.read().await;
        session.snapshot()
    }
}
