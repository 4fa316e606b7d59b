pub mod agent;
pub mod config;
pub mod error;
pub mod flow;
pub mod llm;
pub mod runtime;
pub mod services;
pub mod state;
pub mod utils;

pub use agent::{build_agents, register_agent, Agent, AgentRegistry, Capabilities};
pub use config::{ModelConfig, ModelSpec, PolicyConfig, Provider, Settings};
pub use error::{AnalysisError, Result};
pub use flow::{call_analysis_graph, GraphBuilder, NodeId, Target, WorkflowGraph};
pub use llm::{DynLlmClient, DynSpeechToText, LlmClient, LlmRequest, LlmResponse, SpeechToText};
#[cfg(feature = "openai-client")]
pub use llm::{ChatClient, WhisperClient};
pub use runtime::{CallAnalyzer, FlowExecution, StepEvent, WorkflowExecutor};
pub use state::{CallInput, CallState, InputKind};
pub use utils::logging;
