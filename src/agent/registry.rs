use std::collections::HashMap;
use std::sync::Arc;

use super::agent::Agent;
use crate::flow::NodeId;

pub type AgentRegistry = HashMap<NodeId, Arc<dyn Agent>>;

pub fn register_agent(agent: Arc<dyn Agent>, registry: &mut AgentRegistry) {
    registry.insert(agent.node(), agent);
}
