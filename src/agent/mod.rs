pub mod agent;
pub mod builtin;
pub mod factory;
pub mod registry;

pub use agent::{sentinel, Agent};
pub use factory::{build_agents, Capabilities};
pub use registry::{register_agent, AgentRegistry};
