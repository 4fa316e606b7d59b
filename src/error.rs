use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown node `{0}` in workflow")]
    UnknownNode(String),
    #[error("agent for node `{0}` not registered")]
    AgentNotRegistered(String),
    #[error("invalid transition from `{from}` to `{to}`")]
    InvalidTransition { from: String, to: String },
    #[error("maximum steps {0} exceeded")]
    MaxIterationsExceeded(u32),
    #[error("missing precondition: {0}")]
    MissingPrecondition(String),
    #[error("missing credential `{0}`")]
    MissingCredential(String),
    #[error("audio input declared but no audio payload provided")]
    MissingAudio,
    #[error("agent `{node}` broke the step contract: {reason}")]
    AgentContract { node: String, reason: String },
    #[error("invalid workflow graph: {0}")]
    InvalidGraph(String),
    #[error("capability error: {0}")]
    Capability(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization(err.to_string())
    }
}
