use crate::generator::agents::{StageAgent, StageKind};
use crate::i18n::TargetLanguage;

/// 摘要阶段失败时的兜底文本
pub const SUMMARY_FALLBACK: &str = "Summary generation failed";

/// 把文章浓缩为 3-4 句摘要
pub struct ArticleSummarizer;

impl StageAgent for ArticleSummarizer {
    type Input = String;
    type Output = String;

    fn kind(&self) -> StageKind {
        StageKind::Summarize
    }

    fn system_prompt(&self) -> String {
        "You write short, engaging executive summaries.".to_string()
    }

    fn build_user_prompt(&self, article: &String, language: TargetLanguage) -> String {
        format!(
            "Summarize this article into 3-4 engaging sentences in {} language:\n\n{}",
            language.english_name(),
            article
        )
    }

    fn parse(&self, text: String) -> String {
        text.trim().to_string()
    }

    fn fallback(&self, _article: &String) -> Option<String> {
        Some(SUMMARY_FALLBACK.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::agents::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_summary_is_trimmed() {
        let generator = ScriptedGenerator::new().reply("\nThree sentences.\n");
        let outcome = ArticleSummarizer
            .execute(&generator, &"Article".to_string(), TargetLanguage::Marathi)
            .await
            .unwrap();

        assert_eq!(outcome.value, "Three sentences.");
        assert!(generator.prompts()[0].1.contains("in Marathi language"));
    }

    #[tokio::test]
    async fn test_summary_failure_uses_fixed_text() {
        let generator = ScriptedGenerator::new().fail("boom");
        let outcome = ArticleSummarizer
            .execute(&generator, &"Article".to_string(), TargetLanguage::English)
            .await
            .unwrap();

        assert_eq!(outcome.value, SUMMARY_FALLBACK);
        assert!(outcome.is_degraded());
    }
}
