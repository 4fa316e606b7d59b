use crate::flow::node::{NodeId, Target};
use crate::state::CallState;

// 路由决策：纯函数，不修改状态

pub fn route_after_validation(state: &CallState) -> Target {
    if state.is_valid() {
        Target::Node(NodeId::Intake)
    } else {
        Target::End
    }
}

pub fn route_after_transcription(state: &CallState) -> Target {
    if state.transcript.is_some() && state.errors.is_empty() {
        Target::Node(NodeId::AbuseDetection)
    } else {
        Target::End
    }
}

/// 返工且计数未到上限时回到 summarization，否则进入 QA
pub fn route_after_critic(state: &CallState, ceiling: u32) -> Target {
    if state.needs_revision && state.revision_count < ceiling {
        Target::Node(NodeId::Summarization)
    } else {
        Target::Node(NodeId::QaScoring)
    }
}

pub fn route_after_qa(_state: &CallState) -> Target {
    Target::End
}
