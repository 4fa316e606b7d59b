use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::agent::agent::Agent;
use crate::config::ModelSpec;
use crate::error::{AnalysisError, Result};
use crate::flow::NodeId;
use crate::llm::{DynLlmClient, LlmRequest};
use crate::services::{decode_structured, prompts};
use crate::state::{CallState, QaScores};

#[derive(Debug, Deserialize)]
struct QaPayload {
    empathy: f64,
    professionalism: f64,
    resolution: f64,
    tone: f64,
    #[serde(default)]
    comments: String,
}

/// 坐席服务质量评分
pub struct QaScoringAgent {
    client: DynLlmClient,
    model: ModelSpec,
}

impl QaScoringAgent {
    pub fn new(client: DynLlmClient, model: ModelSpec) -> Self {
        Self { client, model }
    }

    async fn score(&self, transcript: &str) -> Result<QaScores> {
        let request = LlmRequest::new(prompts::QA_SYSTEM, prompts::qa_user(transcript))
            .with_temperature(self.model.temperature)
            .expect_json();
        let response = self.client.complete(request).await?;
        let payload: QaPayload = decode_structured(&response.content, "QA")?;
        QaScores::new(
            payload.empathy,
            payload.professionalism,
            payload.resolution,
            payload.tone,
            payload.comments,
        )
    }
}

#[async_trait]
impl Agent for QaScoringAgent {
    fn node(&self) -> NodeId {
        NodeId::QaScoring
    }

    async fn run(&self, state: &mut CallState) -> Result<()> {
        let transcript = state
            .transcript
            .as_ref()
            .map(|t| t.full_text.clone())
            .ok_or_else(|| {
                AnalysisError::MissingPrecondition("QA scoring requires a transcript".into())
            })?;

        match self.score(&transcript).await {
            Ok(scores) => {
                info!(overall = scores.overall, "QA scores computed");
                state.qa_scores = Some(scores);
            }
            Err(e) => state.record_error(format!("QA scoring failed: {}", e)),
        }
        state.record_step(NodeId::QaScoring, self.model.model.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::ScriptedClient;
    use crate::state::TranscriptData;

    fn agent(client: &ScriptedClient) -> QaScoringAgent {
        QaScoringAgent::new(Arc::new(client.clone()), ModelSpec::openai("gpt-4o-mini", 0.2))
    }

    fn with_transcript() -> CallState {
        let mut state = CallState::from_transcript("Agent: how can I help?");
        state.transcript = Some(TranscriptData {
            segments: Vec::new(),
            full_text: "Agent: how can I help?".into(),
            language: "en".into(),
            confidence: 1.0,
        });
        state
    }

    #[tokio::test]
    async fn test_overall_is_rounded_mean() {
        let client = ScriptedClient::always(
            r#"{"empathy": 8, "professionalism": 9, "resolution": 7, "tone": 9, "comments": "solid"}"#,
        );
        let mut state = with_transcript();
        agent(&client).run(&mut state).await.unwrap();
        let scores = state.qa_scores.unwrap();
        assert_eq!(scores.overall, 8.2);
        assert_eq!(scores.comments, "solid");
    }

    #[tokio::test]
    async fn test_missing_transcript_is_fatal() {
        let client = ScriptedClient::always("{}");
        let mut state = CallState::from_transcript("x");
        let result = agent(&client).run(&mut state).await;
        assert!(matches!(result, Err(AnalysisError::MissingPrecondition(_))));
        assert!(state.execution_path.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_recorded() {
        let client = ScriptedClient::always(
            r#"{"empathy": 12, "professionalism": 9, "resolution": 7, "tone": 9}"#,
        );
        let mut state = with_transcript();
        agent(&client).run(&mut state).await.unwrap();
        assert!(state.qa_scores.is_none());
        assert!(state.errors[0].contains("outside 0..=10"));
    }
}
