//! 单次运行的请求与状态

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::i18n::TargetLanguage;
use crate::research::SearchEngine;

/// 调研深度
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    #[serde(rename = "basic")]
    #[default]
    Basic,
    #[serde(rename = "detailed")]
    Detailed,
}

impl Depth {
    /// 界面上展示的名称
    pub fn label(&self) -> &'static str {
        match self {
            Depth::Basic => "Basic",
            Depth::Detailed => "Detailed",
        }
    }
}

/// 用于拼接提示词，小写
impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Depth::Basic => write!(f, "basic"),
            Depth::Detailed => write!(f, "detailed"),
        }
    }
}

impl std::str::FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Depth::Basic),
            "detailed" => Ok(Depth::Detailed),
            _ => Err(format!("Unknown depth: {}", s)),
        }
    }
}

/// 写作风格
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[serde(rename = "informative")]
    #[default]
    Informative,
    #[serde(rename = "opinionated")]
    Opinionated,
}

impl Style {
    pub fn label(&self) -> &'static str {
        match self {
            Style::Informative => "Informative",
            Style::Opinionated => "Opinionated",
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Style::Informative => write!(f, "informative"),
            Style::Opinionated => write!(f, "opinionated"),
        }
    }
}

impl std::str::FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "informative" => Ok(Style::Informative),
            "opinionated" => Ok(Style::Opinionated),
            _ => Err(format!("Unknown style: {}", s)),
        }
    }
}

/// 一次运行的输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub topic: String,
    pub language: TargetLanguage,
    pub depth: Depth,
    pub style: Style,
    pub search_engine: SearchEngine,
}

impl PipelineRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            language: TargetLanguage::default(),
            depth: Depth::default(),
            style: Style::default(),
            search_engine: SearchEngine::default(),
        }
    }

    /// 使用配置中的语言、深度、风格与检索引擎
    pub fn from_config(topic: impl Into<String>, config: &Config) -> Self {
        Self::new(topic)
            .with_language(config.target_language)
            .with_depth(config.depth)
            .with_style(config.style)
            .with_search_engine(config.search_engine)
    }

    pub fn with_language(mut self, language: TargetLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_search_engine(mut self, search_engine: SearchEngine) -> Self {
        self.search_engine = search_engine;
        self
    }
}

/// 一次运行产出的全部内容
///
/// 由编排器在运行期间独占，完成后以只读快照的形式交出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pub run_id: Uuid,
    pub topic: String,
    pub language: TargetLanguage,
    pub depth: Depth,
    pub style: Style,
    pub search_engine: SearchEngine,
    /// 检索摘要（可能带有兜底提示前缀）
    pub research_summary: String,
    pub links: Vec<String>,
    pub image_url: Option<String>,
    pub subtopics: Vec<String>,
    /// 修订阶段会覆盖初稿
    pub article: String,
    pub final_summary: String,
    pub related_topics: Vec<String>,
    /// 非致命阶段失败留下的告警
    pub warnings: Vec<String>,
}

impl PipelineState {
    pub fn new(request: &PipelineRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            topic: request.topic.trim().to_string(),
            language: request.language,
            depth: request.depth,
            style: request.style,
            search_engine: request.search_engine,
            research_summary: String::new(),
            links: Vec::new(),
            image_url: None,
            subtopics: Vec::new(),
            article: String::new(),
            final_summary: String::new(),
            related_topics: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_and_style_prompt_form() {
        assert_eq!(Depth::Detailed.to_string(), "detailed");
        assert_eq!(Depth::Detailed.label(), "Detailed");
        assert_eq!(Style::Opinionated.to_string(), "opinionated");
        assert_eq!(" Informative ".parse::<Style>().unwrap(), Style::Informative);
        assert!("deep".parse::<Depth>().is_err());
    }

    #[test]
    fn test_new_state_is_empty() {
        let request = PipelineRequest::new("  Rust language ")
            .with_language(TargetLanguage::Tamil)
            .with_depth(Depth::Detailed);
        let state = PipelineState::new(&request);

        assert_eq!(state.topic, "Rust language");
        assert_eq!(state.language, TargetLanguage::Tamil);
        assert_eq!(state.depth, Depth::Detailed);
        assert!(state.article.is_empty());
        assert!(state.links.is_empty());
        assert!(state.warnings.is_empty());
    }

    #[test]
    fn test_request_from_config() {
        let config = Config {
            target_language: TargetLanguage::Kannada,
            style: Style::Opinionated,
            search_engine: SearchEngine::Serper,
            ..Default::default()
        };
        let request = PipelineRequest::from_config("Rust language", &config);

        assert_eq!(request.language, TargetLanguage::Kannada);
        assert_eq!(request.depth, Depth::Basic);
        assert_eq!(request.style, Style::Opinionated);
        assert_eq!(request.search_engine, SearchEngine::Serper);
    }

    #[test]
    fn test_each_state_gets_its_own_run_id() {
        let request = PipelineRequest::new("Rust language");
        assert_ne!(
            PipelineState::new(&request).run_id,
            PipelineState::new(&request).run_id
        );
    }
}
