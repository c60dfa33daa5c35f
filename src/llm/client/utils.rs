use crate::config::LLMConfig;

/// 提示词总长度不超过该值时使用高能效模型
const EFFICIENT_PROMPT_LIMIT: usize = 32 * 1024;

/// 根据提示词长度选择模型
pub fn evaluate_befitting_model(
    llm_config: &LLMConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> String {
    if system_prompt.len() + user_prompt.len() <= EFFICIENT_PROMPT_LIMIT {
        return llm_config.model_efficient.clone();
    }
    llm_config.model_powerful.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_prompt_uses_efficient_model() {
        let config = LLMConfig::default();
        assert_eq!(
            evaluate_befitting_model(&config, "system", "user"),
            config.model_efficient
        );
    }

    #[test]
    fn test_long_prompt_uses_powerful_model() {
        let config = LLMConfig::default();
        let article = "a".repeat(EFFICIENT_PROMPT_LIMIT);
        assert_eq!(
            evaluate_befitting_model(&config, "system", &article),
            config.model_powerful
        );
    }
}
