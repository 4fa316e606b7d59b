use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::info;

use crate::agent::{build_agents, Capabilities};
use crate::config::Settings;
use crate::error::{AnalysisError, Result};
use crate::flow::{call_analysis_graph, WorkflowGraph};
use crate::state::{CallInput, CallState};

use super::executor::{WorkflowExecutor, DEFAULT_MAX_STEPS};
use super::types::StepEvent;

/// 对外入口：一次调用完成一通电话的完整分析
///
/// 图在多次分析之间共享；每次分析拥有独立的 `CallState`。
#[derive(Clone)]
pub struct CallAnalyzer {
    executor: WorkflowExecutor,
}

impl CallAnalyzer {
    pub fn new(graph: WorkflowGraph) -> Self {
        Self {
            executor: WorkflowExecutor::new(graph),
        }
    }

    pub fn with_capabilities(settings: &Settings, capabilities: Capabilities) -> Result<Self> {
        let agents = build_agents(settings, capabilities);
        let graph = call_analysis_graph(agents, &settings.policy)?;
        let max_steps = settings.policy.step_budget().max(DEFAULT_MAX_STEPS);
        Ok(Self::new(graph).with_max_steps(max_steps))
    }

    #[cfg(feature = "openai-client")]
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::with_capabilities(settings, Capabilities::from_settings(settings)?)
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.executor = self.executor.with_max_steps(max_steps);
        self
    }

    pub fn with_events(mut self, sender: mpsc::UnboundedSender<StepEvent>) -> Self {
        self.executor = self.executor.with_events(sender);
        self
    }

    pub fn graph(&self) -> &WorkflowGraph {
        self.executor.graph()
    }

    pub async fn analyze(&self, input: CallInput) -> Result<CallState> {
        let execution = self.executor.run(CallState::new(input)).await?;
        Ok(execution.state)
    }

    /// 同步版本：内部创建单线程运行时，不能在异步上下文中调用
    pub fn analyze_blocking(&self, input: CallInput) -> Result<CallState> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AnalysisError::Other(e.into()))?;
        runtime.block_on(self.analyze(input))
    }

    /// 并发分析多通电话，结果顺序与输入一致
    pub async fn analyze_many(
        &self,
        inputs: Vec<CallInput>,
        concurrency: usize,
    ) -> Vec<Result<CallState>> {
        let total = inputs.len();
        let results: Vec<Result<CallState>> = stream::iter(inputs)
            .map(|input| self.analyze(input))
            .buffered(concurrency.max(1))
            .collect()
            .await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(total, failed, "batch analysis finished");
        results
    }
}
