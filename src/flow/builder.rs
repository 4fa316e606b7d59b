use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::Agent;
use crate::error::{AnalysisError, Result};
use crate::flow::node::{NodeId, Target};
use crate::flow::types::{Edge, RouteFn, WorkflowGraph};

/// 工作流构建器
pub struct GraphBuilder {
    name: String,
    start: Option<NodeId>,
    agents: HashMap<NodeId, Arc<dyn Agent>>,
    edges: HashMap<NodeId, Vec<Edge>>,
}

impl GraphBuilder {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            start: None,
            agents: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// 以 `agent.node()` 注册
    pub fn add_node(&mut self, agent: Arc<dyn Agent>) -> &mut Self {
        self.agents.insert(agent.node(), agent);
        self
    }

    pub fn add_nodes<I>(&mut self, agents: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Agent>>,
    {
        for agent in agents {
            self.add_node(agent);
        }
        self
    }

    pub fn set_start(&mut self, node: NodeId) -> &mut Self {
        self.start = Some(node);
        self
    }

    pub fn connect(&mut self, from: NodeId, to: impl Into<Target>) -> &mut Self {
        self.edges
            .entry(from)
            .or_default()
            .push(Edge::Direct(to.into()));
        self
    }

    pub fn connect_conditional<I>(&mut self, from: NodeId, targets: I, router: RouteFn) -> &mut Self
    where
        I: IntoIterator<Item = Target>,
    {
        self.edges
            .entry(from)
            .or_default()
            .push(Edge::Conditional {
                targets: targets.into_iter().collect(),
                router,
            });
        self
    }

    pub fn build(self) -> Result<WorkflowGraph> {
        let start = self
            .start
            .ok_or_else(|| AnalysisError::InvalidGraph("no entry node set".into()))?;
        if !self.agents.contains_key(&start) {
            return Err(AnalysisError::InvalidGraph(format!(
                "entry node `{}` has no registered agent",
                start
            )));
        }

        let mut edges = HashMap::new();
        for (from, mut outgoing) in self.edges {
            if !self.agents.contains_key(&from) {
                return Err(AnalysisError::InvalidGraph(format!(
                    "edge from unregistered node `{}`",
                    from
                )));
            }
            if outgoing.len() > 1 {
                return Err(AnalysisError::InvalidGraph(format!(
                    "node `{}` has {} outgoing edges",
                    from,
                    outgoing.len()
                )));
            }
            let edge = outgoing.remove(0);
            let targets = edge.targets();
            if targets.is_empty() {
                return Err(AnalysisError::InvalidGraph(format!(
                    "conditional edge from `{}` declares no targets",
                    from
                )));
            }
            for target in targets {
                if let Target::Node(to) = target {
                    if !self.agents.contains_key(&to) {
                        return Err(AnalysisError::InvalidGraph(format!(
                            "edge `{}` -> `{}` references an unregistered node",
                            from, to
                        )));
                    }
                }
            }
            edges.insert(from, edge);
        }

        let mut registered: Vec<NodeId> = self.agents.keys().copied().collect();
        registered.sort();
        if let Some(node) = registered.into_iter().find(|node| !edges.contains_key(node)) {
            return Err(AnalysisError::InvalidGraph(format!(
                "node `{}` has no outgoing edge",
                node
            )));
        }

        Ok(WorkflowGraph {
            name: self.name,
            start,
            agents: self.agents,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::flow::types::route_from_fn;
    use crate::state::CallState;

    struct Noop(NodeId);

    #[async_trait]
    impl Agent for Noop {
        fn node(&self) -> NodeId {
            self.0
        }

        async fn run(&self, state: &mut CallState) -> Result<()> {
            state.record_step(self.0, "noop");
            Ok(())
        }
    }

    fn noop(node: NodeId) -> Arc<dyn Agent> {
        Arc::new(Noop(node))
    }

    #[test]
    fn test_missing_entry_rejected() {
        let mut builder = GraphBuilder::new("g");
        builder.add_node(noop(NodeId::Intake)).connect(NodeId::Intake, Target::End);
        assert!(matches!(builder.build(), Err(AnalysisError::InvalidGraph(_))));
    }

    #[test]
    fn test_dangling_node_rejected() {
        let mut builder = GraphBuilder::new("g");
        builder
            .add_node(noop(NodeId::Intake))
            .add_node(noop(NodeId::Critic))
            .set_start(NodeId::Intake)
            .connect(NodeId::Intake, NodeId::Critic);
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("critic"));
    }

    #[test]
    fn test_edge_to_unregistered_node_rejected() {
        let mut builder = GraphBuilder::new("g");
        builder
            .add_node(noop(NodeId::Intake))
            .set_start(NodeId::Intake)
            .connect(NodeId::Intake, NodeId::QaScoring);
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_two_outgoing_edges_rejected() {
        let mut builder = GraphBuilder::new("g");
        builder
            .add_node(noop(NodeId::Intake))
            .set_start(NodeId::Intake)
            .connect(NodeId::Intake, Target::End)
            .connect(NodeId::Intake, Target::End);
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_router_outside_declared_targets() {
        let mut builder = GraphBuilder::new("g");
        builder
            .add_node(noop(NodeId::Intake))
            .add_node(noop(NodeId::Critic))
            .set_start(NodeId::Intake)
            .connect_conditional(
                NodeId::Intake,
                [Target::End],
                route_from_fn(|_| Target::Node(NodeId::Critic)),
            )
            .connect(NodeId::Critic, Target::End);
        let graph = builder.build().unwrap();
        let state = CallState::default();
        assert!(matches!(
            graph.next(NodeId::Intake, &state),
            Err(AnalysisError::InvalidTransition { .. })
        ));
        assert!(graph.permits(NodeId::Intake, Target::End));
        assert!(!graph.permits(NodeId::Intake, Target::Node(NodeId::Critic)));
    }
}
