use crate::agent::AgentRegistry;
use crate::config::PolicyConfig;
use crate::error::{AnalysisError, Result};
use crate::flow::builder::GraphBuilder;
use crate::flow::node::{NodeId, Target};
use crate::flow::router::{
    route_after_critic, route_after_qa, route_after_transcription, route_after_validation,
};
use crate::flow::types::{route_from_fn, WorkflowGraph};

pub const CALL_ANALYSIS_FLOW: &str = "call_analysis";

/// 默认通话分析图
///
/// ```text
/// validation -> intake -> transcription -> abuse_detection -> summarization -> critic -> qa_scoring -> END
///      \-> END                  \-> END                            ^-------------/
/// ```
pub fn call_analysis_graph(mut agents: AgentRegistry, policy: &PolicyConfig) -> Result<WorkflowGraph> {
    let mut builder = GraphBuilder::new(CALL_ANALYSIS_FLOW);
    for node in NodeId::ALL {
        let agent = agents
            .remove(&node)
            .ok_or_else(|| AnalysisError::AgentNotRegistered(node.to_string()))?;
        builder.add_node(agent);
    }

    let ceiling = policy.max_revisions;
    builder
        .set_start(NodeId::Validation)
        .connect_conditional(
            NodeId::Validation,
            [Target::Node(NodeId::Intake), Target::End],
            route_from_fn(route_after_validation),
        )
        .connect(NodeId::Intake, NodeId::Transcription)
        .connect_conditional(
            NodeId::Transcription,
            [Target::Node(NodeId::AbuseDetection), Target::End],
            route_from_fn(route_after_transcription),
        )
        .connect(NodeId::AbuseDetection, NodeId::Summarization)
        .connect(NodeId::Summarization, NodeId::Critic)
        .connect_conditional(
            NodeId::Critic,
            [
                Target::Node(NodeId::Summarization),
                Target::Node(NodeId::QaScoring),
            ],
            route_from_fn(move |state| route_after_critic(state, ceiling)),
        )
        .connect_conditional(
            NodeId::QaScoring,
            [Target::End],
            route_from_fn(route_after_qa),
        );
    builder.build()
}
