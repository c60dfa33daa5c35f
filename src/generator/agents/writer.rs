use crate::generator::agents::{StageAgent, StageKind};
use crate::generator::state::{Depth, Style};
use crate::i18n::TargetLanguage;

/// 初稿阶段的输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftInput {
    pub depth: Depth,
    pub style: Style,
    pub subtopics: Vec<String>,
    pub research_summary: String,
}

/// 根据子主题与调研摘要撰写初稿
///
/// 唯一没有兜底值的阶段：失败即终止本次运行。
pub struct ArticleWriter;

impl StageAgent for ArticleWriter {
    type Input = DraftInput;
    type Output = String;

    fn kind(&self) -> StageKind {
        StageKind::Draft
    }

    fn system_prompt(&self) -> String {
        "You are a writer who turns research notes into well-structured articles.".to_string()
    }

    fn build_user_prompt(&self, input: &DraftInput, language: TargetLanguage) -> String {
        format!(
            "{}\nWrite a {} article with these sub-topics:\n{}\nStyle: {}\nInclude these research points: {}",
            language.prompt_instruction(),
            input.depth,
            input.subtopics.join("\n"),
            input.style,
            input.research_summary
        )
    }

    fn parse(&self, text: String) -> String {
        text
    }

    fn fallback(&self, _input: &DraftInput) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::generator::agents::testing::ScriptedGenerator;

    fn input() -> DraftInput {
        DraftInput {
            depth: Depth::Detailed,
            style: Style::Opinionated,
            subtopics: vec!["1. Origins".to_string(), "2. Today".to_string()],
            research_summary: "Rust is a systems language.".to_string(),
        }
    }

    #[test]
    fn test_draft_prompt_layout() {
        let prompt = ArticleWriter.build_user_prompt(&input(), TargetLanguage::Bengali);
        assert_eq!(
            prompt,
            "Write in Bengali.\nWrite a detailed article with these sub-topics:\n1. Origins\n2. Today\nStyle: opinionated\nInclude these research points: Rust is a systems language."
        );
    }

    #[tokio::test]
    async fn test_draft_returns_model_text() {
        let generator = ScriptedGenerator::new().reply("# Rust\n\nA language.");
        let outcome = ArticleWriter
            .execute(&generator, &input(), TargetLanguage::English)
            .await
            .unwrap();
        assert_eq!(outcome.value, "# Rust\n\nA language.");
    }

    #[tokio::test]
    async fn test_draft_failure_is_fatal() {
        let generator = ScriptedGenerator::new().fail("quota exceeded");
        let err = ArticleWriter
            .execute(&generator, &input(), TargetLanguage::English)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError {
                stage: StageKind::Draft,
                message: "quota exceeded".to_string(),
            }
        );
    }
}
