//! 终端展示：运行进度与最终报告

use crate::generator::outlet::citation::Reference;
use crate::generator::state::PipelineState;
use crate::generator::workflow::{PipelineEvent, PipelineObserver, PipelinePhase};

/// 渲染最终报告
pub fn render_report(state: &PipelineState, references: &[Reference]) -> String {
    let mut report = String::new();

    report.push_str("\n📝 Final Article\n");
    report.push_str("================\n");
    if let Some(image_url) = &state.image_url {
        report.push_str(&format!("🖼️  {}\n\n", image_url));
    }
    report.push_str(state.article.trim());
    report.push('\n');

    report.push_str("\n📌 Executive Summary\n");
    report.push_str("====================\n");
    report.push_str(state.final_summary.trim());
    report.push('\n');

    if !references.is_empty() {
        report.push_str("\n📚 References\n");
        report.push_str("=============\n");
        for reference in references {
            report.push_str(&format!(
                "- {}\n    APA: {}\n",
                reference.url, reference.citation
            ));
        }
    }

    if !state.related_topics.is_empty() {
        report.push_str("\n🔗 Related Topics\n");
        report.push_str("=================\n");
        report.push_str(&state.related_topics.join("\n"));
        report.push('\n');
    }

    report
}

fn phase_header(phase: PipelinePhase) -> Option<&'static str> {
    match phase {
        PipelinePhase::Researching => Some("\n## Phase 1: Research"),
        PipelinePhase::Planning => Some("\n## Phase 2: Planning"),
        PipelinePhase::Drafting => Some("\n## Phase 3: Writing"),
        PipelinePhase::Revising => Some("\n## Phase 4: Refining"),
        PipelinePhase::Summarizing => Some("\n## Phase 5: Summarizing"),
        PipelinePhase::RelatedTopics => Some("\n🧠 Suggesting related topics..."),
        _ => None,
    }
}

/// 把运行进度打印到终端
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::PhaseEntered(phase) => {
                if let Some(header) = phase_header(*phase) {
                    println!("{}", header);
                }
            }
            PipelineEvent::Progress { percent, label } => {
                println!("⏳ [{:>3}%] {}", percent, label);
            }
            PipelineEvent::ResearchGathered { summary, links, .. } => {
                println!("**Summary:** {}", summary);
                if !links.is_empty() {
                    println!("**Sources:** {}", links.join(", "));
                }
            }
            PipelineEvent::SubtopicsPlanned(subtopics) => {
                println!("**Subtopics:**\n{}", subtopics.join("\n"));
            }
            PipelineEvent::Warning(message) => eprintln!("⚠️  {}", message),
            PipelineEvent::Completed { total, .. } => {
                println!("✅ Process Complete! ({:.1}s)", total.as_secs_f64());
            }
            PipelineEvent::Aborted { hint, is_warning } => {
                if *is_warning {
                    eprintln!("⚠️  {}", hint);
                } else {
                    eprintln!("❌ {}", hint);
                }
            }
        }
    }
}
