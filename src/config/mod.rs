use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::generator::state::{Depth, Style};
use crate::i18n::TargetLanguage;
use crate::research::SearchEngine;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "quill.toml";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    #[default]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 目标语言
    pub target_language: TargetLanguage,

    /// 调研深度
    pub depth: Depth,

    /// 写作风格
    pub style: Style,

    /// 检索引擎
    pub search_engine: SearchEngine,

    /// 文章导出目录
    pub output_path: PathBuf,

    /// 是否把文章导出为文本文件
    pub export_article: bool,

    /// 检索只得到提示信息（没有实际资料）时是否中止流水线
    pub halt_on_empty_research: bool,

    /// 是否启用详细日志
    pub verbose: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 检索服务配置
    pub search: SearchConfig,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址（openai / deepseek 兼容接口使用）
    pub api_base_url: String,

    /// 高能效模型，用于常规长度的提示词
    pub model_efficient: String,

    /// 高质量模型，用于超长提示词
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,
}

/// 检索服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Serper API KEY
    pub serper_api_key: String,

    /// Serper 搜索接口地址
    pub serper_endpoint: String,

    /// Serper 地区偏好（gl 参数）
    pub serper_region: String,

    /// MediaWiki API 地址
    pub wikipedia_endpoint: String,

    /// 百科摘要的句子数上限
    pub wikipedia_sentences: u32,

    /// DuckDuckGo Instant Answer 接口地址
    pub duckduckgo_endpoint: String,

    /// HTTP 请求的 User-Agent
    pub user_agent: String,

    /// HTTP 请求超时（秒），不设置时使用传输层默认行为
    pub request_timeout_seconds: Option<u64>,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 加载配置：显式路径 > 当前目录下的 quill.toml > 默认值
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let default_config_path = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE);

        if default_config_path.exists() {
            Self::from_file(&default_config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// 启动时检查必需的凭据
    pub fn validate_credentials(&self) -> Result<(), ConfigError> {
        if self.llm.provider != LLMProvider::Ollama && self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingSecret {
                name: "LLM API key",
                env_var: "QUILL_LLM_API_KEY",
                config_key: "llm.api_key",
            });
        }

        if self.search_engine == SearchEngine::Serper
            && self.search.serper_api_key.trim().is_empty()
        {
            return Err(ConfigError::MissingSecret {
                name: "Serper API key",
                env_var: "SERPER_API_KEY",
                config_key: "search.serper_api_key",
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_language: TargetLanguage::default(),
            depth: Depth::default(),
            style: Style::default(),
            search_engine: SearchEngine::default(),
            output_path: PathBuf::from("./quill.out"),
            export_article: true,
            halt_on_empty_research: false,
            verbose: false,
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        let api_key = std::env::var("QUILL_LLM_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .unwrap_or_default();

        Self {
            provider: LLMProvider::default(),
            api_key,
            api_base_url: String::from("https://generativelanguage.googleapis.com/v1beta"),
            model_efficient: String::from("gemini-2.5-flash"),
            model_powerful: String::from("gemini-2.5-pro"),
            max_tokens: 8192,
            temperature: 0.7,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            serper_api_key: std::env::var("SERPER_API_KEY").unwrap_or_default(),
            serper_endpoint: String::from("https://google.serper.dev/search"),
            serper_region: String::from("in"),
            wikipedia_endpoint: String::from("https://en.wikipedia.org/w/api.php"),
            wikipedia_sentences: 5,
            duckduckgo_endpoint: String::from("https://api.duckduckgo.com/"),
            user_agent: format!("quill-rs/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_seconds: None,
        }
    }
}
