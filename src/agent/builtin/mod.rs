// 内置 Agent 模块 - 通话分析流水线的七个节点

pub mod abuse;
pub mod critic;
pub mod intake;
pub mod qa;
pub mod summarization;
pub mod transcription;
pub mod validation;

pub use abuse::AbuseDetectionAgent;
pub use critic::CriticAgent;
pub use intake::IntakeAgent;
pub use qa::QaScoringAgent;
pub use summarization::SummarizationAgent;
pub use transcription::TranscriptionAgent;
pub use validation::InputValidator;
