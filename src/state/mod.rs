// 状态模块 - 共享状态与派生产物

mod artifacts;
mod call;
mod path;

pub use artifacts::{
    overall_score, AbuseCategory, AbuseFinding, AbuseSeverity, CallMetadata, CallSummary,
    InputShape, QaScores, ResolutionStatus, Sentiment, SummaryCritique, TextStats,
    TranscriptData, TranscriptSegment, ValidationResult,
};
pub use call::{CallInput, CallState, InputKind};
pub use path::PathEntry;
