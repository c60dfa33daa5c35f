//! 把一次检索放到独立的 tokio 任务上执行
//!
//! 调用方等待 [`DispatchHandle`] 即可拿到检索结果；任务本身的崩溃或取消
//! 会变成 [`PipelineError::Dispatch`]，不会把 panic 传播给调用方。
//! 句柄被丢弃时任务随之中止。

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::error::PipelineError;
use crate::research::{ResearchProvider, ResearchResult};

/// 正在执行的检索任务
pub struct DispatchHandle {
    provider: &'static str,
    handle: JoinHandle<ResearchResult>,
}

/// 在后台任务上执行检索
pub fn dispatch(provider: Arc<dyn ResearchProvider>, topic: String) -> DispatchHandle {
    let name = provider.name();
    debug!(provider = name, topic = %topic, "dispatching research task");
    let handle = tokio::spawn(async move { provider.search(&topic).await });
    DispatchHandle {
        provider: name,
        handle,
    }
}

fn describe_join_error(provider: &str, err: JoinError) -> PipelineError {
    if err.is_panic() {
        PipelineError::Dispatch(format!("{} research task panicked", provider))
    } else {
        PipelineError::Dispatch(format!("{} research task was cancelled", provider))
    }
}

impl Future for DispatchHandle {
    type Output = Result<ResearchResult, PipelineError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let provider = self.provider;
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.map_err(|err| describe_join_error(provider, err)))
    }
}

impl Drop for DispatchHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
