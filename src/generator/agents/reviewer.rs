use crate::generator::agents::{StageAgent, StageKind};
use crate::i18n::TargetLanguage;

/// 审阅初稿并返回改进后的全文，失败时保留原文
pub struct ArticleReviewer;

impl StageAgent for ArticleReviewer {
    type Input = String;
    type Output = String;

    fn kind(&self) -> StageKind {
        StageKind::Revise
    }

    fn system_prompt(&self) -> String {
        "You are an editor who critiques and rewrites articles.".to_string()
    }

    fn build_user_prompt(&self, article: &String, language: TargetLanguage) -> String {
        format!(
            "Review this {} article for:\n1. Missing citations\n2. Structural issues\n3. Length adequacy\nReturn IMPROVED VERSION only:\n\n{}",
            language.english_name(),
            article
        )
    }

    fn parse(&self, text: String) -> String {
        text
    }

    fn fallback(&self, article: &String) -> Option<String> {
        Some(article.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::agents::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_revision_replaces_article() {
        let generator = ScriptedGenerator::new().reply("Improved draft");
        let outcome = ArticleReviewer
            .execute(&generator, &"Draft".to_string(), TargetLanguage::Telugu)
            .await
            .unwrap();

        assert_eq!(outcome.value, "Improved draft");
        assert!(generator.prompts()[0].1.starts_with("Review this Telugu article for:"));
        assert!(generator.prompts()[0].1.ends_with("\n\nDraft"));
    }

    #[tokio::test]
    async fn test_revision_failure_keeps_draft() {
        let generator = ScriptedGenerator::new().fail("connection reset");
        let outcome = ArticleReviewer
            .execute(&generator, &"Draft".to_string(), TargetLanguage::English)
            .await
            .unwrap();

        assert_eq!(outcome.value, "Draft");
        assert_eq!(
            outcome.warning.as_deref(),
            Some("Reflection Agent Error: connection reset")
        );
    }
}
