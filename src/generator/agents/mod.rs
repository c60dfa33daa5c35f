//! 五个生成阶段
//!
//! 每个阶段恰好调用一次模型。除初稿阶段外，模型调用失败时阶段降级为兜底值并附带告警，
//! 由编排器决定如何展示；初稿阶段没有兜底值，失败即终止本次运行。

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::i18n::TargetLanguage;
use crate::llm::client::TextGenerator;

pub mod planner;
pub mod related_topics;
pub mod reviewer;
pub mod summarizer;
pub mod writer;

pub use planner::SubtopicPlanner;
pub use related_topics::RelatedTopicsAdvisor;
pub use reviewer::ArticleReviewer;
pub use summarizer::ArticleSummarizer;
pub use writer::{ArticleWriter, DraftInput};

/// 生成阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Plan,
    Draft,
    Revise,
    Summarize,
    RelatedTopics,
}

/// 面向用户的阶段名称，与错误提示中的 "<阶段> Agent Error" 对应
impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Plan => write!(f, "Planning"),
            StageKind::Draft => write!(f, "Writing"),
            StageKind::Revise => write!(f, "Reflection"),
            StageKind::Summarize => write!(f, "Summary"),
            StageKind::RelatedTopics => write!(f, "Related Topics"),
        }
    }
}

/// 阶段执行结果：成功的产出，或兜底值加告警
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome<T> {
    pub value: T,
    pub warning: Option<String>,
}

impl<T> StageOutcome<T> {
    pub fn completed(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn degraded(value: T, warning: impl Into<String>) -> Self {
        Self {
            value,
            warning: Some(warning.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

/// 生成阶段 trait
#[async_trait]
pub trait StageAgent: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;

    fn kind(&self) -> StageKind;

    /// 系统提示词
    fn system_prompt(&self) -> String;

    /// 根据输入与目标语言构造用户提示词
    fn build_user_prompt(&self, input: &Self::Input, language: TargetLanguage) -> String;

    /// 把模型的原始文本转换为阶段产出
    fn parse(&self, text: String) -> Self::Output;

    /// 模型调用失败时的兜底值，`None` 表示该阶段失败是致命的
    fn fallback(&self, input: &Self::Input) -> Option<Self::Output>;

    /// 执行阶段：一次模型调用，失败时按 [`StageAgent::fallback`] 降级
    async fn execute(
        &self,
        generator: &dyn TextGenerator,
        input: &Self::Input,
        language: TargetLanguage,
    ) -> Result<StageOutcome<Self::Output>, GenerationError> {
        let kind = self.kind();
        let system_prompt = self.system_prompt();
        let user_prompt = self.build_user_prompt(input, language);
        debug!(stage = %kind, prompt_chars = user_prompt.len(), "calling model");

        let message = match generator.generate(&system_prompt, &user_prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                return Ok(StageOutcome::completed(self.parse(text)));
            }
            Ok(_) => "model returned an empty response".to_string(),
            Err(err) => err.to_string(),
        };

        let error = GenerationError {
            stage: kind,
            message,
        };
        match self.fallback(input) {
            Some(value) => {
                warn!(stage = %kind, error = %error, "stage failed, using fallback");
                Ok(StageOutcome::degraded(value, error.to_string()))
            }
            None => Err(error),
        }
    }
}

/// 按行拆分模型输出，丢弃空行
pub(crate) fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
