use async_trait::async_trait;
use tracing::{info, warn};

use crate::agent::agent::{sentinel, Agent};
use crate::config::ModelSpec;
use crate::error::Result;
use crate::flow::NodeId;
use crate::llm::{DynLlmClient, LlmRequest};
use crate::services::{decode_structured, prompts};
use crate::state::{CallState, CallSummary};

const KEY_POINTS_MIN: usize = 3;
const KEY_POINTS_MAX: usize = 5;

/// 生成结构化摘要；返工时带上上一轮评审意见
pub struct SummarizationAgent {
    client: DynLlmClient,
    model: ModelSpec,
}

impl SummarizationAgent {
    pub fn new(client: DynLlmClient, model: ModelSpec) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl Agent for SummarizationAgent {
    fn node(&self) -> NodeId {
        NodeId::Summarization
    }

    async fn run(&self, state: &mut CallState) -> Result<()> {
        let attempt = state.revision_count + 1;
        let text = match &state.transcript {
            Some(t) => t.full_text.clone(),
            None => {
                state.record_error("Summarization skipped: no transcript available");
                state.record_attempt(NodeId::Summarization, attempt, sentinel::SKIPPED);
                return Ok(());
            }
        };

        let prior = if state.revision_count > 0 {
            state.critique.as_ref()
        } else {
            None
        };
        let request = LlmRequest::new(prompts::SUMMARY_SYSTEM, prompts::summary_user(&text, prior))
            .with_temperature(self.model.temperature)
            .expect_json();

        let outcome = match self.client.complete(request).await {
            Ok(response) => decode_structured::<CallSummary>(&response.content, "summary"),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(summary) => {
                let points = summary.key_points.len();
                if !(KEY_POINTS_MIN..=KEY_POINTS_MAX).contains(&points) {
                    warn!(points, "summary key point count outside 3..=5");
                }
                info!(attempt, sentiment = ?summary.sentiment, "summary generated");
                state.summary = Some(summary);
            }
            Err(e) => state.record_error(format!("Summarization failed: {}", e)),
        }
        state.record_attempt(NodeId::Summarization, attempt, self.model.model.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::ScriptedClient;
    use crate::state::{ResolutionStatus, Sentiment, SummaryCritique, TranscriptData};

    const SUMMARY: &str = r#"```json
{"brief_summary": "Customer reported a duplicate charge. Agent issued a refund.",
 "key_points": ["duplicate charge", "refund issued", "customer satisfied"],
 "action_items": ["confirm refund in 5 days"],
 "customer_intent": "get a refund",
 "sentiment": "positive",
 "resolution_status": "resolved",
 "topics": ["billing"]}
```"#;

    fn state() -> CallState {
        let mut state = CallState::from_transcript("Customer: refund please");
        state.transcript = Some(TranscriptData {
            segments: Vec::new(),
            full_text: "Customer: refund please".into(),
            language: "en".into(),
            confidence: 1.0,
        });
        state
    }

    fn agent(client: &ScriptedClient) -> SummarizationAgent {
        SummarizationAgent::new(Arc::new(client.clone()), ModelSpec::openai("gpt-4o-mini", 0.2))
    }

    #[tokio::test]
    async fn test_summary_decoded_from_fenced_json() {
        let client = ScriptedClient::always(SUMMARY);
        let mut state = state();
        agent(&client).run(&mut state).await.unwrap();
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.sentiment, Sentiment::Positive);
        assert_eq!(summary.resolution_status, ResolutionStatus::Resolved);
        assert_eq!(state.path_labels(), vec!["summarization:v1"]);
        assert!(client.requests()[0].json_output);
    }

    #[tokio::test]
    async fn test_rework_includes_critique() {
        let client = ScriptedClient::always(SUMMARY);
        let mut state = state();
        state.revision_count = 1;
        state.critique = Some(SummaryCritique {
            faithfulness_score: 4,
            completeness_score: 8,
            conciseness_score: 8,
            needs_revision: true,
            feedback: "invented a callback".into(),
            revision_instructions: Some("drop the callback".into()),
        });
        agent(&client).run(&mut state).await.unwrap();
        let user = &client.requests()[0].user;
        assert!(user.contains("invented a callback"));
        assert!(user.contains("drop the callback"));
        assert_eq!(state.path_labels(), vec!["summarization:v2"]);
    }

    #[tokio::test]
    async fn test_malformed_summary_is_recorded() {
        let client = ScriptedClient::always("I could not summarize this call.");
        let mut state = state();
        agent(&client).run(&mut state).await.unwrap();
        assert!(state.summary.is_none());
        assert_eq!(state.errors.len(), 1);
        assert_eq!(state.models_used, vec!["gpt-4o-mini"]);
    }
}
