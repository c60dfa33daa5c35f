use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::generator::state::PipelineState;

/// 会话元数据
#[derive(Debug, Clone)]
pub struct SessionMetadata {
    pub created_at: DateTime<Utc>,
    pub last_updated: Option<DateTime<Utc>>,
    pub commits: u64,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMetadata {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            last_updated: None,
            commits: 0,
        }
    }
}

/// 会话存储
///
/// 只保存最近一次产出结果的运行快照，每次提交整体替换。中止的运行不会提交，
/// 因此上一次的结果在新结果产生之前始终可见。不做跨进程持久化。
#[derive(Debug, Default)]
pub struct SessionMemory {
    latest: Option<Arc<PipelineState>>,
    metadata: SessionMetadata,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用新快照整体替换旧快照
    pub fn commit(&mut self, state: PipelineState) -> Arc<PipelineState> {
        let snapshot = Arc::new(state);
        self.latest = Some(snapshot.clone());
        self.metadata.last_updated = Some(Utc::now());
        self.metadata.commits += 1;
        snapshot
    }

    /// 最近一次提交的快照
    pub fn snapshot(&self) -> Option<Arc<PipelineState>> {
        self.latest.clone()
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }
}
