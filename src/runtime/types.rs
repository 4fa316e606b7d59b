use serde::Serialize;

use crate::flow::NodeId;
use crate::state::CallState;

/// 运行时类型定义

/// 每执行完一个节点发出的进度事件
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepEvent {
    pub step: u32,
    pub node: NodeId,
    pub label: String,
    pub model: String,
    pub error_count: usize,
}

/// 一次遍历的结果
#[derive(Clone, Debug)]
pub struct FlowExecution {
    pub flow_name: String,
    pub last_node: NodeId,
    pub steps: u32,
    pub state: CallState,
}
