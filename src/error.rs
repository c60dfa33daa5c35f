//! 流水线错误分类
//!
//! 校验错误在任何外部调用之前中止流水线；检索错误按类别给出提示；
//! 只有初稿阶段的生成错误是致命的，其余阶段降级为兜底值。

use thiserror::Error;

use crate::generator::agents::StageKind;

/// 主题输入校验错误，原样展示给用户
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Topic is too short. Please enter a more descriptive topic.")]
    TooShort,
    #[error("Topic is too long. Please shorten your topic.")]
    TooLong,
    #[error(
        "Topic contains special characters. Please use only letters, numbers, spaces, hyphens, commas, and periods."
    )]
    InvalidCharacters,
    #[error("Topic is too generic. Please enter a more specific topic.")]
    TooGeneric,
}

/// 检索错误类别，决定给用户的提示语
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorCategory {
    Ambiguous,
    NotFound,
    Connectivity,
    Credentials,
    Other,
}

/// 检索提供方返回的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SearchError {
    pub category: SearchErrorCategory,
    pub message: String,
}

impl SearchError {
    /// 根据错误描述归类
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        let category = if lower.contains("api key") {
            SearchErrorCategory::Credentials
        } else if lower.contains("ambiguous") {
            SearchErrorCategory::Ambiguous
        } else if lower.contains("no wikipedia page found") || lower.contains("not found") {
            SearchErrorCategory::NotFound
        } else if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("connect")
            || lower.contains("timed out")
            || lower.contains("dns")
        {
            SearchErrorCategory::Connectivity
        } else {
            SearchErrorCategory::Other
        };

        Self { category, message }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            category: SearchErrorCategory::NotFound,
            message: message.into(),
        }
    }
}

/// 单个生成阶段的模型调用失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} Agent Error: {message}")]
pub struct GenerationError {
    pub stage: StageKind,
    pub message: String,
}

/// 启动阶段的配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing credential {name}: set {env_var} or `{config_key}` in quill.toml")]
    MissingSecret {
        name: &'static str,
        env_var: &'static str,
        config_key: &'static str,
    },
}

/// 一次流水线运行的终止原因
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("dispatch failed: {0}")]
    Dispatch(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("run halted by user")]
    Cancelled,
    #[error("system error: {0}")]
    System(#[from] anyhow::Error),
}

impl PipelineError {
    /// 面向用户的提示语
    pub fn user_hint(&self) -> String {
        match self {
            PipelineError::Validation(err) => err.to_string(),
            PipelineError::Search(err) => match err.category {
                SearchErrorCategory::Ambiguous => {
                    format!("{} Try specifying your topic further.", err.message)
                }
                SearchErrorCategory::NotFound => {
                    format!("{} Try a different or more specific topic.", err.message)
                }
                SearchErrorCategory::Connectivity => {
                    "Network error: Please check your internet connection and try again."
                        .to_string()
                }
                SearchErrorCategory::Credentials => {
                    "API key error: Please check your configuration and ensure your API key is valid."
                        .to_string()
                }
                SearchErrorCategory::Other => format!("Research error: {}", err.message),
            },
            PipelineError::Dispatch(message) => format!(
                "Dispatch failed: {}. Retry or check your internet connection.",
                message
            ),
            PipelineError::Generation(err) => err.to_string(),
            PipelineError::Cancelled => {
                "Run halted. Previous results, if any, are kept.".to_string()
            }
            PipelineError::System(err) => format!(
                "System Error: {}. If this persists, check your API keys, internet connection, or try again later.",
                err
            ),
        }
    }

    /// 是否属于警告级别（而非错误级别）的提示
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            PipelineError::Validation(_)
                | PipelineError::Cancelled
                | PipelineError::Search(SearchError {
                    category: SearchErrorCategory::Ambiguous | SearchErrorCategory::NotFound,
                    ..
                })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ambiguous() {
        let err = SearchError::classify(
            "Disambiguation error: The topic 'Mercury' is ambiguous. Please be more specific.",
        );
        assert_eq!(err.category, SearchErrorCategory::Ambiguous);
    }

    #[test]
    fn test_classify_credentials_before_other_categories() {
        let err = SearchError::classify("Error: Serper rejected the API key (status 403)");
        assert_eq!(err.category, SearchErrorCategory::Credentials);
    }

    #[test]
    fn test_classify_connectivity() {
        let err = SearchError::classify("Error: error sending request: connection refused");
        assert_eq!(err.category, SearchErrorCategory::Connectivity);
    }

    #[test]
    fn test_classify_other() {
        let err = SearchError::classify("Error: expected value at line 1 column 1");
        assert_eq!(err.category, SearchErrorCategory::Other);
    }

    #[test]
    fn test_user_hints() {
        let ambiguous = PipelineError::Search(SearchError::classify("topic is ambiguous."));
        assert_eq!(
            ambiguous.user_hint(),
            "topic is ambiguous. Try specifying your topic further."
        );
        assert!(ambiguous.is_warning());

        let other = PipelineError::Search(SearchError::classify("Error: boom"));
        assert_eq!(other.user_hint(), "Research error: Error: boom");
        assert!(!other.is_warning());

        let validation = PipelineError::from(ValidationError::TooGeneric);
        assert_eq!(
            validation.user_hint(),
            "Topic is too generic. Please enter a more specific topic."
        );

        let draft = PipelineError::from(GenerationError {
            stage: StageKind::Draft,
            message: "quota exceeded".to_string(),
        });
        assert_eq!(draft.user_hint(), "Writing Agent Error: quota exceeded");
    }
}
