use async_trait::async_trait;
use tracing::info;

use crate::agent::agent::{sentinel, Agent};
use crate::config::{ModelSpec, PolicyConfig};
use crate::error::Result;
use crate::flow::NodeId;
use crate::llm::{DynLlmClient, LlmRequest};
use crate::services::{prompts, AbuseResponseParser};
use crate::state::CallState;

/// 滥用内容检测
pub struct AbuseDetectionAgent {
    client: DynLlmClient,
    model: ModelSpec,
    parser: AbuseResponseParser,
}

impl AbuseDetectionAgent {
    pub fn new(client: DynLlmClient, model: ModelSpec, policy: &PolicyConfig) -> Self {
        Self {
            client,
            model,
            parser: AbuseResponseParser::new(policy.severity_low_max, policy.severity_medium_max),
        }
    }
}

#[async_trait]
impl Agent for AbuseDetectionAgent {
    fn node(&self) -> NodeId {
        NodeId::AbuseDetection
    }

    async fn run(&self, state: &mut CallState) -> Result<()> {
        let text = match &state.transcript {
            Some(t) => t.full_text.clone(),
            None => {
                state.record_error("Abuse detection skipped: no transcript available");
                state.record_step(NodeId::AbuseDetection, sentinel::SKIPPED);
                return Ok(());
            }
        };

        let request = LlmRequest::new(prompts::ABUSE_SYSTEM, prompts::abuse_user(&text))
            .with_temperature(self.model.temperature);
        match self.client.complete(request).await {
            Ok(response) => {
                let findings = self.parser.parse(&response.content);
                let escalations = findings.iter().filter(|f| f.requires_escalation()).count();
                info!(findings = findings.len(), escalations, "abuse detection finished");
                state.abuse_findings = Some(findings);
            }
            Err(e) => state.record_error(format!("Abuse detection failed: {}", e)),
        }
        state.record_step(NodeId::AbuseDetection, self.model.model.clone());
        Ok(())
    }
}
