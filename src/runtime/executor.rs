use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::error::{AnalysisError, Result};
use crate::flow::{NodeId, Target, WorkflowGraph};
use crate::state::CallState;

use super::types::{FlowExecution, StepEvent};

pub const DEFAULT_MAX_STEPS: u32 = 64;

/// 工作流执行器：从入口节点开始依次调用 Agent，直到 END
#[derive(Clone)]
pub struct WorkflowExecutor {
    graph: Arc<WorkflowGraph>,
    max_steps: u32,
    events: Option<mpsc::UnboundedSender<StepEvent>>,
}

impl WorkflowExecutor {
    pub fn new(graph: WorkflowGraph) -> Self {
        Self::from_shared(Arc::new(graph))
    }

    pub fn from_shared(graph: Arc<WorkflowGraph>) -> Self {
        Self {
            graph,
            max_steps: DEFAULT_MAX_STEPS,
            events: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_events(mut self, sender: mpsc::UnboundedSender<StepEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    #[instrument(skip(self, state), fields(flow = %self.graph.name()))]
    pub async fn run(&self, mut state: CallState) -> Result<FlowExecution> {
        let mut node = self.graph.start();
        let mut steps = 0u32;

        loop {
            if steps >= self.max_steps {
                return Err(AnalysisError::MaxIterationsExceeded(self.max_steps));
            }
            steps += 1;

            let agent = self.graph.agent(node)?;
            let path_before = state.execution_path.len();
            let models_before = state.models_used.len();
            debug!(step = steps, node = %node, agent = agent.name(), "running agent");

            agent.run(&mut state).await?;
            self.check_contract(node, &state, path_before, models_before)?;
            self.emit(steps, node, &state);

            match self.graph.next(node, &state)? {
                Target::Node(next) => {
                    debug!(from = %node, to = %next, "transition");
                    node = next;
                }
                Target::End => {
                    info!(
                        steps,
                        last_node = %node,
                        errors = state.errors.len(),
                        "flow finished"
                    );
                    return Ok(FlowExecution {
                        flow_name: self.graph.name().to_string(),
                        last_node: node,
                        steps,
                        state,
                    });
                }
            }
        }
    }

    /// 每个 Agent 恰好追加一项路径与一项模型，且路径项属于自己
    fn check_contract(
        &self,
        node: NodeId,
        state: &CallState,
        path_before: usize,
        models_before: usize,
    ) -> Result<()> {
        let appended_path = state.execution_path.len().saturating_sub(path_before);
        let appended_models = state.models_used.len().saturating_sub(models_before);
        if appended_path != 1 {
            return Err(AnalysisError::AgentContract {
                node: node.to_string(),
                reason: format!("expected one execution path entry, found {}", appended_path),
            });
        }
        if appended_models != 1 {
            return Err(AnalysisError::AgentContract {
                node: node.to_string(),
                reason: format!("expected one model entry, found {}", appended_models),
            });
        }
        match state.execution_path.last() {
            Some(entry) if entry.node == node => Ok(()),
            Some(entry) => Err(AnalysisError::AgentContract {
                node: node.to_string(),
                reason: format!("path entry recorded for `{}`", entry.node),
            }),
            None => Err(AnalysisError::AgentContract {
                node: node.to_string(),
                reason: "empty execution path".to_string(),
            }),
        }
    }

    fn emit(&self, step: u32, node: NodeId, state: &CallState) {
        let Some(sender) = &self.events else {
            return;
        };
        let event = StepEvent {
            step,
            node,
            label: state
                .execution_path
                .last()
                .map(|e| e.label())
                .unwrap_or_default(),
            model: state.models_used.last().cloned().unwrap_or_default(),
            error_count: state.errors.len(),
        };
        if sender.send(event).is_err() {
            warn!("step event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::agent::Agent;
    use crate::flow::{route_from_fn, GraphBuilder};

    struct Looping;

    #[async_trait]
    impl Agent for Looping {
        fn node(&self) -> NodeId {
            NodeId::Critic
        }

        async fn run(&self, state: &mut CallState) -> Result<()> {
            state.record_step(NodeId::Critic, "loop");
            Ok(())
        }
    }

    struct Silent;

    #[async_trait]
    impl Agent for Silent {
        fn node(&self) -> NodeId {
            NodeId::Intake
        }

        async fn run(&self, _state: &mut CallState) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_step_budget_stops_runaway_graph() {
        let mut builder = GraphBuilder::new("loop");
        builder
            .add_node(Arc::new(Looping))
            .set_start(NodeId::Critic)
            .connect_conditional(
                NodeId::Critic,
                [Target::Node(NodeId::Critic), Target::End],
                route_from_fn(|_| Target::Node(NodeId::Critic)),
            );
        let executor = WorkflowExecutor::new(builder.build().unwrap()).with_max_steps(5);
        let result = executor.run(CallState::default()).await;
        assert!(matches!(result, Err(AnalysisError::MaxIterationsExceeded(5))));
    }

    #[tokio::test]
    async fn test_agent_must_record_its_step() {
        let mut builder = GraphBuilder::new("silent");
        builder
            .add_node(Arc::new(Silent))
            .set_start(NodeId::Intake)
            .connect(NodeId::Intake, Target::End);
        let executor = WorkflowExecutor::new(builder.build().unwrap());
        let result = executor.run(CallState::default()).await;
        assert!(matches!(result, Err(AnalysisError::AgentContract { .. })));
    }

    #[tokio::test]
    async fn test_events_follow_steps() {
        let mut builder = GraphBuilder::new("single");
        builder
            .add_node(Arc::new(Looping))
            .set_start(NodeId::Critic)
            .connect(NodeId::Critic, Target::End);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = WorkflowExecutor::new(builder.build().unwrap()).with_events(tx);
        let execution = executor.run(CallState::default()).await.unwrap();
        assert_eq!(execution.steps, 1);
        assert_eq!(execution.last_node, NodeId::Critic);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.label, "critic");
        assert_eq!(event.model, "loop");
    }
}
