// Flow 模块 - 节点、边、路由与默认分析图

pub mod builder;
pub mod call_analysis;
pub mod node;
pub mod router;
pub mod types;

// 重新导出核心类型
pub use builder::GraphBuilder;
pub use call_analysis::{call_analysis_graph, CALL_ANALYSIS_FLOW};
pub use node::{NodeId, Target};
pub use router::{
    route_after_critic, route_after_qa, route_after_transcription, route_after_validation,
};
pub use types::{route_from_fn, Edge, RouteFn, WorkflowGraph};
