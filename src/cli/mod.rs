use crate::config::{Config, LLMProvider};
use crate::generator::state::{Depth, Style};
use crate::i18n::TargetLanguage;
use crate::research::SearchEngine;
use anyhow::Result;
use clap::Parser;
use std::future::Future;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, Lines};

/// Quill - 主题调研与文章生成工具
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(
    about = "Researches a topic from Wikipedia, Serper or DuckDuckGo, then plans, drafts, revises and summarizes an article about it with a language model."
)]
#[command(version)]
pub struct Args {
    /// 主题
    #[arg(required_unless_present_any = ["interactive", "check_connection"])]
    pub topic: Option<String>,

    /// 交互模式：从标准输入逐行读取主题
    #[arg(short, long)]
    pub interactive: bool,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 输出路径
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 目标语言 (en, hi, ta, te, bn, mr, kn, gu, ml, pa)
    #[arg(short, long)]
    pub language: Option<String>,

    /// 调研深度 (basic, detailed)
    #[arg(short, long)]
    pub depth: Option<String>,

    /// 写作风格 (informative, opinionated)
    #[arg(short, long)]
    pub style: Option<String>,

    /// 检索引擎 (wikipedia, serper, duckduckgo)
    #[arg(short, long)]
    pub engine: Option<String>,

    /// 不导出文章文本文件
    #[arg(long)]
    pub no_export: bool,

    /// 检索没有实际资料时中止运行
    #[arg(long)]
    pub halt_on_empty_research: bool,

    /// 启动时检查模型连接
    #[arg(long)]
    pub check_connection: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 高能效模型，用于常规长度的提示词
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，用于超长提示词
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// LLM Provider (openai, deepseek, openrouter, anthropic, gemini, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// Serper API KEY
    #[arg(long)]
    pub serper_api_key: Option<String>,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }

        if let Some(language_str) = self.language {
            if let Ok(language) = language_str.parse::<TargetLanguage>() {
                config.target_language = language;
            } else {
                eprintln!(
                    "⚠️ Unknown language: {}, keeping {}",
                    language_str,
                    config.target_language.english_name()
                );
            }
        }
        if let Some(depth_str) = self.depth {
            if let Ok(depth) = depth_str.parse::<Depth>() {
                config.depth = depth;
            } else {
                eprintln!("⚠️ Unknown depth: {}, keeping {}", depth_str, config.depth);
            }
        }
        if let Some(style_str) = self.style {
            if let Ok(style) = style_str.parse::<Style>() {
                config.style = style;
            } else {
                eprintln!("⚠️ Unknown style: {}, keeping {}", style_str, config.style);
            }
        }
        if let Some(engine_str) = self.engine {
            if let Ok(engine) = engine_str.parse::<SearchEngine>() {
                config.search_engine = engine;
            } else {
                eprintln!(
                    "⚠️ Unknown search engine: {}, keeping {}",
                    engine_str, config.search_engine
                );
            }
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ Unknown provider: {}, keeping {}",
                    provider_str, config.llm.provider
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        if let Some(serper_api_key) = self.serper_api_key {
            config.search.serper_api_key = serper_api_key;
        }

        // 开关类参数只在显式给出时覆盖配置文件
        if self.no_export {
            config.export_article = false;
        }
        if self.halt_on_empty_research {
            config.halt_on_empty_research = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        Ok(config)
    }
}

/// 交互模式下读取下一个主题
///
/// 输入结束、空行或 `interrupt` 先完成时返回 `None`。
pub async fn next_topic<R, F>(lines: &mut Lines<R>, interrupt: F) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = interrupt => Ok(None),
        line = lines.next_line() => Ok(line?
            .map(|line| line.trim().to_string())
            .filter(|topic| !topic.is_empty())),
    }
}

// Include tests
#[cfg(test)]
mod tests;
