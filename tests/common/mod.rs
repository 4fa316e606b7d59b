#![allow(dead_code)]

use std::sync::Arc;

use callflow::agent::Capabilities;
use callflow::llm::ScriptedClient;
use callflow::{CallAnalyzer, Settings};

pub const DIALOGUE: &str = "Customer: Hi, I was charged twice for my internet bill this month and I would like a refund please.
Agent: I am sorry about that. Let me check your account. I can see the duplicate charge from March third.
Customer: Thank you, that is exactly the one.
Agent: I have issued the refund, it should arrive within five business days.";

pub const ABUSIVE: &str = "Customer: This is bullshit! You people are idiots!
Agent: I understand you are frustrated. Let me look into the outage on your line right now.
Customer: Just fix it, I have been waiting for three days already.";

pub const SUMMARY: &str = r#"{
  "brief_summary": "Customer was charged twice. Agent issued a refund.",
  "key_points": ["duplicate charge", "refund issued", "five business days"],
  "action_items": ["monitor refund"],
  "customer_intent": "refund a duplicate charge",
  "sentiment": "positive",
  "resolution_status": "resolved",
  "topics": ["billing", "refund"]
}"#;

pub const APPROVE: &str = r#"{"faithfulness_score": 9, "completeness_score": 8, "conciseness_score": 9, "feedback": "accurate"}"#;

pub const REJECT: &str = r#"{"faithfulness_score": 5, "completeness_score": 8, "conciseness_score": 8,
"feedback": "claims a callback was scheduled", "revision_instructions": "remove the callback claim"}"#;

pub const QA: &str = r#"{"empathy": 8, "professionalism": 9, "resolution": 9, "tone": 8, "comments": "handled well"}"#;

/// 每种能力一个独立的离线客户端，便于分别断言调用情况
pub struct Scripted {
    pub classifier: ScriptedClient,
    pub generator: ScriptedClient,
    pub evaluator: ScriptedClient,
    pub scorer: ScriptedClient,
}

impl Scripted {
    pub fn new(classifier: ScriptedClient, evaluator: ScriptedClient) -> Self {
        Self {
            classifier,
            generator: ScriptedClient::always(SUMMARY),
            evaluator,
            scorer: ScriptedClient::always(QA),
        }
    }

    pub fn approving() -> Self {
        Self::new(
            ScriptedClient::always("NO_ABUSE_DETECTED"),
            ScriptedClient::always(APPROVE),
        )
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            classifier: Arc::new(self.classifier.clone()),
            generator: Arc::new(self.generator.clone()),
            evaluator: Arc::new(self.evaluator.clone()),
            scorer: Arc::new(self.scorer.clone()),
            speech: None,
        }
    }

    pub fn analyzer(&self) -> CallAnalyzer {
        CallAnalyzer::with_capabilities(&Settings::default(), self.capabilities())
            .expect("default graph builds")
    }
}
