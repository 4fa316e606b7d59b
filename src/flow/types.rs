use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::agent::Agent;
use crate::error::{AnalysisError, Result};
use crate::flow::node::{NodeId, Target};
use crate::state::CallState;

/// 路由函数：只读状态，返回下一个目标
pub type RouteFn = Arc<dyn Fn(&CallState) -> Target + Send + Sync>;

/// 从普通函数创建路由
pub fn route_from_fn<F>(func: F) -> RouteFn
where
    F: Fn(&CallState) -> Target + Send + Sync + 'static,
{
    Arc::new(func)
}

/// 节点的出边
#[derive(Clone)]
pub enum Edge {
    Direct(Target),
    /// 路由结果必须落在 `targets` 内
    Conditional { targets: Vec<Target>, router: RouteFn },
}

impl Edge {
    pub fn targets(&self) -> Vec<Target> {
        match self {
            Edge::Direct(target) => vec![*target],
            Edge::Conditional { targets, .. } => targets.clone(),
        }
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Direct(target) => f.debug_tuple("Direct").field(target).finish(),
            Edge::Conditional { targets, .. } => f
                .debug_struct("Conditional")
                .field("targets", targets)
                .finish_non_exhaustive(),
        }
    }
}

/// 已校验的工作流图
pub struct WorkflowGraph {
    pub(crate) name: String,
    pub(crate) start: NodeId,
    pub(crate) agents: HashMap<NodeId, Arc<dyn Agent>>,
    pub(crate) edges: HashMap<NodeId, Edge>,
}

impl WorkflowGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn agent(&self, node: NodeId) -> Result<Arc<dyn Agent>> {
        self.agents
            .get(&node)
            .cloned()
            .ok_or_else(|| AnalysisError::AgentNotRegistered(node.to_string()))
    }

    pub fn edge(&self, node: NodeId) -> Option<&Edge> {
        self.edges.get(&node)
    }

    /// 计算 `node` 之后的目标，路由结果不在声明集合内时报错
    pub fn next(&self, node: NodeId, state: &CallState) -> Result<Target> {
        match self.edges.get(&node) {
            Some(Edge::Direct(target)) => Ok(*target),
            Some(Edge::Conditional { targets, router }) => {
                let target = router(state);
                if targets.contains(&target) {
                    Ok(target)
                } else {
                    Err(AnalysisError::InvalidTransition {
                        from: node.to_string(),
                        to: target.to_string(),
                    })
                }
            }
            None => Err(AnalysisError::UnknownNode(node.to_string())),
        }
    }

    pub fn successors(&self, node: NodeId) -> Vec<Target> {
        self.edges
            .get(&node)
            .map(Edge::targets)
            .unwrap_or_default()
    }

    pub fn permits(&self, from: NodeId, to: Target) -> bool {
        self.successors(from).contains(&to)
    }

    /// 按节点顺序列出所有边
    pub fn topology(&self) -> Vec<(NodeId, Vec<Target>)> {
        let mut nodes: Vec<NodeId> = self.edges.keys().copied().collect();
        nodes.sort();
        nodes
            .into_iter()
            .map(|node| (node, self.successors(node)))
            .collect()
    }
}

impl fmt::Debug for WorkflowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowGraph")
            .field("name", &self.name)
            .field("start", &self.start)
            .field("edges", &self.edges)
            .finish()
    }
}
