use crate::generator::agents::{StageAgent, StageKind, non_empty_lines};
use crate::i18n::TargetLanguage;

/// 把主题拆分为 3-5 个子主题
pub struct SubtopicPlanner;

impl StageAgent for SubtopicPlanner {
    type Input = String;
    type Output = Vec<String>;

    fn kind(&self) -> StageKind {
        StageKind::Plan
    }

    fn system_prompt(&self) -> String {
        "You are a research planner who outlines articles.".to_string()
    }

    fn build_user_prompt(&self, topic: &String, language: TargetLanguage) -> String {
        format!(
            "Break '{}' into 3-5 sub-topics in {}. Numbered list only.",
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
