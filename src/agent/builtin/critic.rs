use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::agent::agent::{sentinel, Agent};
use crate::config::{ModelSpec, PolicyConfig};
use crate::error::Result;
use crate::flow::NodeId;
use crate::llm::{DynLlmClient, LlmRequest};
use crate::services::{decode_structured, prompts};
use crate::state::{CallState, CallSummary, SummaryCritique};

#[derive(Debug, Deserialize)]
struct CritiquePayload {
    faithfulness_score: u8,
    completeness_score: u8,
    conciseness_score: u8,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    revision_instructions: Option<String>,
}

/// 独立评审摘要，决定是否返工
pub struct CriticAgent {
    client: DynLlmClient,
    model: ModelSpec,
    rework_threshold: u8,
    max_revisions: u32,
}

impl CriticAgent {
    pub fn new(client: DynLlmClient, model: ModelSpec, policy: &PolicyConfig) -> Self {
        Self {
            client,
            model,
            rework_threshold: policy.rework_threshold,
            max_revisions: policy.max_revisions,
        }
    }

    fn skip(state: &mut CallState, reason: &str) {
        state.record_error(format!("Critic cannot run: {}", reason));
        state.critique = None;
        state.needs_revision = false;
        state.record_step(NodeId::Critic, sentinel::SKIPPED);
    }

    async fn critique(&self, transcript: &str, summary: &CallSummary) -> Result<SummaryCritique> {
        let request = LlmRequest::new(prompts::CRITIC_SYSTEM, prompts::critic_user(transcript, summary))
            .with_temperature(self.model.temperature)
            .expect_json();
        let response = self.client.complete(request).await?;
        let payload: CritiquePayload = decode_structured(&response.content, "critique")?;
        SummaryCritique::evaluate(
            payload.faithfulness_score,
            payload.completeness_score,
            payload.conciseness_score,
            self.rework_threshold,
            payload.feedback,
            payload.revision_instructions,
        )
    }
}

#[async_trait]
impl Agent for CriticAgent {
    fn node(&self) -> NodeId {
        NodeId::Critic
    }

    async fn run(&self, state: &mut CallState) -> Result<()> {
        let transcript = match &state.transcript {
            Some(t) => t.full_text.clone(),
            None => {
                Self::skip(state, "no transcript available");
                return Ok(());
            }
        };
        let summary = match &state.summary {
            Some(summary) => summary.clone(),
            None => {
                Self::skip(state, "no summary to evaluate");
                return Ok(());
            }
        };

        match self.critique(&transcript, &summary).await {
            Ok(critique) => {
                info!(
                    faithfulness = critique.faithfulness_score,
                    completeness = critique.completeness_score,
                    conciseness = critique.conciseness_score,
                    needs_revision = critique.needs_revision,
                    "summary critiqued"
                );
                state.needs_revision = critique.needs_revision;
                if critique.needs_revision {
                    if state.revision_count < self.max_revisions {
                        state.revision_count += 1;
                    }
                    state.current_agent = Some(NodeId::Summarization);
                } else {
                    state.current_agent = Some(NodeId::QaScoring);
                }
                state.critique = Some(critique);
            }
            Err(e) => {
                // 上一轮的评审针对的是旧摘要，不能保留
                state.record_error(format!("Critique failed: {}", e));
                state.critique = None;
                state.needs_revision = false;
                state.current_agent = Some(NodeId::QaScoring);
            }
        }
        state.record_step(NodeId::Critic, self.model.model.clone());
        Ok(())
    }
}
