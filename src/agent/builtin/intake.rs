use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::agent::agent::{sentinel, Agent};
use crate::error::Result;
use crate::flow::NodeId;
use crate::state::{CallMetadata, CallState};

/// 生成通话元数据：编号、时间戳、估算时长
pub struct IntakeAgent {
    words_per_minute: f64,
}

impl IntakeAgent {
    pub fn new(words_per_minute: f64) -> Self {
        Self { words_per_minute }
    }

    pub fn call_id() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("CALL-{}", hex[..8].to_uppercase())
    }

    pub fn estimate_duration(&self, word_count: usize) -> Option<f64> {
        if word_count == 0 || self.words_per_minute <= 0.0 {
            return None;
        }
        Some(word_count as f64 / self.words_per_minute * 60.0)
    }
}

#[async_trait]
impl Agent for IntakeAgent {
    fn node(&self) -> NodeId {
        NodeId::Intake
    }

    async fn run(&self, state: &mut CallState) -> Result<()> {
        let metadata = CallMetadata {
            call_id: Self::call_id(),
            timestamp: Utc::now(),
            duration_seconds: self.estimate_duration(state.word_count()),
            input_kind: state.input_kind,
            file_name: state.file_name.clone(),
        };
        tracing::info!(call_id = %metadata.call_id, "call registered");
        state.metadata = Some(metadata);
        state.record_step(NodeId::Intake, sentinel::RULE_BASED);
        Ok(())
    }
}
