use crate::generator::agents::{StageAgent, StageKind, non_empty_lines};
use crate::i18n::TargetLanguage;

/// 推荐 3 个相关主题
pub struct RelatedTopicsAdvisor;

impl StageAgent for RelatedTopicsAdvisor {
    type Input = String;
    type Output = Vec<String>;

    fn kind(&self) -> StageKind {
        StageKind::RelatedTopics
    }

    fn system_prompt(&self) -> String {
        "You suggest related topics for further reading.".to_string()
    }

    fn build_user_prompt(&self, topic: &String, language: TargetLanguage) -> String {
        format!(
            "Suggest 3 related topics for '{}' in {}.",
            topic,
            language.english_name()
        )
    }

    fn parse(&self, text: String) -> Vec<String> {
        non_empty_lines(&text)
    }

    fn fallback(&self, _topic: &String) -> Option<Vec<String>> {
        Some(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::agents::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_related_topics_are_trimmed_lines() {
        let generator =
            ScriptedGenerator::new().reply("  Machine Learning  \n\nRobotics\n Neural Networks\n");
        let outcome = RelatedTopicsAdvisor
            .execute(
                &generator,
                &"Artificial Intelligence".to_string(),
                TargetLanguage::English,
            )
            .await
            .unwrap();

        assert_eq!(
            outcome.value,
            vec!["Machine Learning", "Robotics", "Neural Networks"]
        );
        assert_eq!(
            generator.prompts()[0].1,
            "Suggest 3 related topics for 'Artificial Intelligence' in English."
        );
    }

    #[tokio::test]
    async fn test_related_topics_failure_is_empty() {
        let generator = ScriptedGenerator::new().fail("timeout");
        let outcome = RelatedTopicsAdvisor
            .execute(&generator, &"Rust".to_string(), TargetLanguage::English)
            .await
            .unwrap();

        assert!(outcome.value.is_empty());
        assert_eq!(
            outcome.warning.as_deref(),
            Some("Related Topics Agent Error: timeout")
        );
    }
}
