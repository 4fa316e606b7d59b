mod common;

use callflow::agent::build_agents;
use callflow::{call_analysis_graph, AnalysisError, NodeId, PolicyConfig, Settings, Target};
use common::Scripted;

#[test]
fn default_graph_declares_expected_edges() -> anyhow::Result<()> {
    let scripted = Scripted::approving();
    let agents = build_agents(&Settings::default(), scripted.capabilities());
    let graph = call_analysis_graph(agents, &PolicyConfig::default())?;

    assert_eq!(graph.start(), NodeId::Validation);
    assert_eq!(
        graph.successors(NodeId::Validation),
        vec![Target::Node(NodeId::Intake), Target::End]
    );
    assert_eq!(
        graph.successors(NodeId::Intake),
        vec![Target::Node(NodeId::Transcription)]
    );
    assert!(graph.permits(NodeId::Transcription, Target::End));
    assert!(graph.permits(NodeId::Critic, Target::Node(NodeId::Summarization)));
    assert!(graph.permits(NodeId::Critic, Target::Node(NodeId::QaScoring)));
    assert!(!graph.permits(NodeId::Critic, Target::End));
    assert_eq!(graph.successors(NodeId::QaScoring), vec![Target::End]);
    assert_eq!(graph.topology().len(), NodeId::ALL.len());
    Ok(())
}

#[test]
fn missing_agent_is_reported() {
    let scripted = Scripted::approving();
    let mut agents = build_agents(&Settings::default(), scripted.capabilities());
    agents.remove(&NodeId::Critic);
    let result = call_analysis_graph(agents, &PolicyConfig::default());
    assert!(matches!(result, Err(AnalysisError::AgentNotRegistered(node)) if node == "critic"));
}
