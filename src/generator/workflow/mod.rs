//! 流水线编排
//!
//! 状态机：`Idle -> Validating -> Researching -> Planning -> Drafting -> Revising ->
//! Summarizing -> RelatedTopics -> Complete`，任何非终态都可以进入 `Aborted`。
//! 状态只能前进，不会重入。

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::{debug, info, instrument, warn};

use crate::error::{PipelineError, SearchError};
use crate::generator::agents::{
    ArticleReviewer, ArticleSummarizer, ArticleWriter, DraftInput, RelatedTopicsAdvisor,
    StageAgent, StageOutcome, SubtopicPlanner,
};
use crate::generator::context::GeneratorContext;
use crate::generator::state::{PipelineRequest, PipelineState};
use crate::generator::validation::validate_topic;
use crate::llm::client::TextGenerator;
use crate::research::{ProviderRegistry, dispatch};

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelinePhase {
    Idle,
    Validating,
    Researching,
    Planning,
    Drafting,
    Revising,
    Summarizing,
    RelatedTopics,
    Complete,
    Aborted,
}

impl PipelinePhase {
    fn ordinal(&self) -> u8 {
        match self {
            PipelinePhase::Idle => 0,
            PipelinePhase::Validating => 1,
            PipelinePhase::Researching => 2,
            PipelinePhase::Planning => 3,
            PipelinePhase::Drafting => 4,
            PipelinePhase::Revising => 5,
            PipelinePhase::Summarizing => 6,
            PipelinePhase::RelatedTopics => 7,
            PipelinePhase::Complete => 8,
            PipelinePhase::Aborted => 9,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelinePhase::Complete | PipelinePhase::Aborted)
    }

    /// 进入该阶段时上报的进度，仅用于展示
    pub fn checkpoint(&self) -> Option<(u8, &'static str)> {
        match self {
            PipelinePhase::Researching => Some((0, "Researching...")),
            PipelinePhase::Planning => Some((25, "Planning subtopics...")),
            PipelinePhase::Drafting => Some((50, "Writing article...")),
            PipelinePhase::Revising => Some((75, "Refining article...")),
            PipelinePhase::Summarizing => Some((90, "Summarizing article...")),
            PipelinePhase::Complete => Some((100, "Done!")),
            _ => None,
        }
    }
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelinePhase::Idle => "Idle",
            PipelinePhase::Validating => "Validating",
            PipelinePhase::Researching => "Researching",
            PipelinePhase::Planning => "Planning",
            PipelinePhase::Drafting => "Drafting",
            PipelinePhase::Revising => "Revising",
            PipelinePhase::Summarizing => "Summarizing",
            PipelinePhase::RelatedTopics => "RelatedTopics",
            PipelinePhase::Complete => "Complete",
            PipelinePhase::Aborted => "Aborted",
        };
        write!(f, "{}", name)
    }
}

/// 阶段迁移记录，保证只前进、不重入
#[derive(Debug)]
pub struct PhaseTracker {
    current: PipelinePhase,
    visited: Vec<PipelinePhase>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            current: PipelinePhase::Idle,
            visited: vec![PipelinePhase::Idle],
        }
    }

    pub fn current(&self) -> PipelinePhase {
        self.current
    }

    pub fn visited(&self) -> &[PipelinePhase] {
        &self.visited
    }

    pub fn advance(&mut self, next: PipelinePhase) -> Result<(), PipelineError> {
        let allowed = !self.current.is_terminal()
            && next != PipelinePhase::Aborted
            && next.ordinal() > self.current.ordinal()
            && !self.visited.contains(&next);
        if !allowed {
            return Err(PipelineError::System(anyhow!(
                "invalid phase transition {} -> {}",
                self.current,
                next
            )));
        }
        self.current = next;
        self.visited.push(next);
        Ok(())
    }

    /// 进入 Aborted；已在终态时返回 false
    pub fn abort(&mut self) -> bool {
        if self.current.is_terminal() {
            return false;
        }
        self.current = PipelinePhase::Aborted;
        self.visited.push(PipelinePhase::Aborted);
        true
    }
}

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<PipelinePhase, Instant>,
    phase_durations: Vec<(PipelinePhase, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase: PipelinePhase) {
        self.phase_start_times.insert(phase, Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase: PipelinePhase) -> Option<Duration> {
        let start_time = self.phase_start_times.remove(&phase)?;
        let duration = start_time.elapsed();
        self.phase_durations.push((phase, duration));
        Some(duration)
    }

    /// 获取总执行时间
    pub fn total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 按完成顺序排列的各阶段执行时间
    pub fn phase_durations(&self) -> &[(PipelinePhase, Duration)] {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "Total time: {:.2}s\n",
            self.total_duration().as_secs_f64()
        );
        for (phase, duration) in &self.phase_durations {
            report.push_str(&format!("- {}: {:.3}s\n", phase, duration.as_secs_f64()));
        }
        report
    }
}

/// 运行过程中上报给观察者的事件
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    PhaseEntered(PipelinePhase),
    Progress {
        percent: u8,
        label: &'static str,
    },
    ResearchGathered {
        summary: String,
        links: Vec<String>,
        informational: bool,
    },
    SubtopicsPlanned(Vec<String>),
    /// 非致命阶段失败
    Warning(String),
    Completed {
        total: Duration,
        phases: Vec<(PipelinePhase, Duration)>,
    },
    Aborted {
        hint: String,
        is_warning: bool,
    },
}

/// 流水线观察者，负责展示进度
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// 只写日志的观察者
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::PhaseEntered(phase) => debug!(%phase, "phase entered"),
            PipelineEvent::Progress { percent, label } => info!(percent, "{}", label),
            PipelineEvent::ResearchGathered {
                links,
                informational,
                ..
            } => info!(links = links.len(), informational, "research gathered"),
            PipelineEvent::SubtopicsPlanned(subtopics) => {
                info!(count = subtopics.len(), "subtopics planned")
            }
            PipelineEvent::Warning(message) => warn!("{}", message),
            PipelineEvent::Completed { total, .. } => {
                info!(elapsed_ms = total.as_millis() as u64, "pipeline complete")
            }
            PipelineEvent::Aborted { hint, .. } => warn!("pipeline aborted: {}", hint),
        }
    }
}

/// 单次运行的簿记：阶段、计时与事件上报
struct RunLedger<'a> {
    observer: &'a dyn PipelineObserver,
    tracker: PhaseTracker,
    timing: TimingScope,
}

impl<'a> RunLedger<'a> {
    fn new(observer: &'a dyn PipelineObserver) -> Self {
        Self {
            observer,
            tracker: PhaseTracker::new(),
            timing: TimingScope::new(),
        }
    }

    fn enter(&mut self, phase: PipelinePhase) -> Result<(), PipelineError> {
        let previous = self.tracker.current();
        if let Some(elapsed) = self.timing.end_phase(previous) {
            debug!(phase = %previous, elapsed_ms = elapsed.as_millis() as u64, "phase finished");
        }
        self.tracker.advance(phase)?;
        self.timing.start_phase(phase);

        self.observer.on_event(&PipelineEvent::PhaseEntered(phase));
        if let Some((percent, label)) = phase.checkpoint() {
            self.observer
                .on_event(&PipelineEvent::Progress { percent, label });
        }
        Ok(())
    }

    /// 取出阶段产出，降级时记录告警
    fn absorb<T>(&self, state: &mut PipelineState, outcome: StageOutcome<T>) -> T {
        if let Some(warning) = outcome.warning {
            self.observer
                .on_event(&PipelineEvent::Warning(warning.clone()));
            state.warnings.push(warning);
        }
        outcome.value
    }

    fn complete(&mut self) -> Result<(), PipelineError> {
        self.enter(PipelinePhase::Complete)?;
        self.observer.on_event(&PipelineEvent::Completed {
            total: self.timing.total_duration(),
            phases: self.timing.phase_durations().to_vec(),
        });
        Ok(())
    }

    fn abort(&mut self, error: &PipelineError) {
        if self.tracker.abort() {
            self.observer.on_event(&PipelineEvent::Aborted {
                hint: error.user_hint(),
                is_warning: error.is_warning(),
            });
        }
    }
}

/// 流水线编排器
///
/// 严格顺序执行：一次检索、每个生成阶段一次模型调用，任意时刻最多一个模型调用在途。
#[derive(Clone)]
pub struct PipelineOrchestrator {
    generator: Arc<dyn TextGenerator>,
    providers: ProviderRegistry,
    halt_on_empty_research: bool,
}

impl PipelineOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, providers: ProviderRegistry) -> Self {
        Self {
            generator,
            providers,
            halt_on_empty_research: false,
        }
    }

    pub fn from_context(context: &GeneratorContext) -> Self {
        Self::new(context.generator.clone(), context.providers.clone())
            .with_halt_on_empty_research(context.config.halt_on_empty_research)
    }

    /// 检索只得到提示信息时是否中止
    pub fn with_halt_on_empty_research(mut self, halt: bool) -> Self {
        self.halt_on_empty_research = halt;
        self
    }

    /// 执行一次完整运行
    #[instrument(name = "pipeline", skip_all, fields(topic = %request.topic))]
    pub async fn run(
        &self,
        request: &PipelineRequest,
        observer: &dyn PipelineObserver,
    ) -> Result<PipelineState, PipelineError> {
        let mut ledger = RunLedger::new(observer);
        match self.execute(request, &mut ledger).await {
            Ok(state) => {
                info!(run_id = %state.run_id, warnings = state.warnings.len(), "run finished");
                debug!("{}", ledger.timing.generate_timing_report());
                Ok(state)
            }
            Err(err) => {
                ledger.abort(&err);
                Err(err)
            }
        }
    }

    /// 执行一次运行，`halt` 先完成时中止运行并丢弃部分结果
    ///
    /// 中止时正在进行的检索任务随之取消。
    pub async fn run_until<F>(
        &self,
        request: &PipelineRequest,
        observer: &dyn PipelineObserver,
        halt: F,
    ) -> Result<PipelineState, PipelineError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = halt => {
                let err = PipelineError::Cancelled;
                observer.on_event(&PipelineEvent::Aborted {
                    hint: err.user_hint(),
                    is_warning: err.is_warning(),
                });
                Err(err)
            }
            result = self.run(request, observer) => result,
        }
    }

    async fn execute(
        &self,
        request: &PipelineRequest,
        ledger: &mut RunLedger<'_>,
    ) -> Result<PipelineState, PipelineError> {
        let generator = self.generator.as_ref();
        let language = request.language;

        ledger.enter(PipelinePhase::Validating)?;
        validate_topic(&request.topic)?;
        let mut state = PipelineState::new(request);

        ledger.enter(PipelinePhase::Researching)?;
        let provider = self.providers.get(request.search_engine).ok_or_else(|| {
            PipelineError::System(anyhow!(
                "no research provider registered for {}",
                request.search_engine
            ))
        })?;
        let research = dispatch(provider, state.topic.clone()).await?;
        // 提示信息与空摘要都算没有调研资料
        let informational = research.is_informational()
            || research.summary().is_some_and(|summary| summary.trim().is_empty());
        let (summary, links, image_url) = research.into_parts().map_err(SearchError::classify)?;
        if informational && self.halt_on_empty_research {
            let message = if summary.trim().is_empty() {
                format!("No research material found for '{}'.", state.topic)
            } else {
                summary
            };
            return Err(SearchError::not_found(message).into());
        }
        ledger
            .observer
            .on_event(&PipelineEvent::ResearchGathered {
                summary: summary.clone(),
                links: links.clone(),
                informational,
            });
        state.research_summary = summary;
        state.links = links;
        state.image_url = image_url;

        ledger.enter(PipelinePhase::Planning)?;
        let outcome = SubtopicPlanner
            .execute(generator, &state.topic, language)
            .await?;
        state.subtopics = ledger.absorb(&mut state, outcome);
        ledger
            .observer
            .on_event(&PipelineEvent::SubtopicsPlanned(state.subtopics.clone()));

        ledger.enter(PipelinePhase::Drafting)?;
        let draft_input = DraftInput {
            depth: state.depth,
            style: state.style,
            subtopics: state.subtopics.clone(),
            research_summary: state.research_summary.clone(),
        };
        let outcome = ArticleWriter
            .execute(generator, &draft_input, language)
            .await?;
        state.article = ledger.absorb(&mut state, outcome);

        ledger.enter(PipelinePhase::Revising)?;
        let outcome = ArticleReviewer
            .execute(generator, &state.article, language)
            .await?;
        state.article = ledger.absorb(&mut state, outcome);

        ledger.enter(PipelinePhase::Summarizing)?;
        let outcome = ArticleSummarizer
            .execute(generator, &state.article, language)
            .await?;
        state.final_summary = ledger.absorb(&mut state, outcome);

        ledger.enter(PipelinePhase::RelatedTopics)?;
        let outcome = RelatedTopicsAdvisor
            .execute(generator, &state.topic, language)
            .await?;
        state.related_topics = ledger.absorb(&mut state, outcome);

        ledger.complete()?;
        Ok(state)
    }
}

/// 启动一次运行并把结果提交到会话存储
///
/// 运行失败或被中止时不提交，会话中保留上一次的结果。
pub async fn launch<F>(
    context: &GeneratorContext,
    request: &PipelineRequest,
    observer: &dyn PipelineObserver,
    halt: F,
) -> Result<Arc<PipelineState>, PipelineError>
where
    F: Future<Output = ()>,
{
    let orchestrator = PipelineOrchestrator::from_context(context);
    let state = orchestrator.run_until(request, observer, halt).await?;
    Ok(context.commit(state).await)
}
