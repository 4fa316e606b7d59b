use std::sync::Arc;

use super::agent::Agent;
use super::builtin::{
    AbuseDetectionAgent, CriticAgent, InputValidator, IntakeAgent, QaScoringAgent,
    SummarizationAgent, TranscriptionAgent,
};
use super::registry::{register_agent, AgentRegistry};
use crate::config::Settings;
use crate::llm::{DynLlmClient, DynSpeechToText};

/// Agent 依赖的外部能力句柄
///
/// 评审使用独立的 `evaluator`，与生成摘要的模型分开。
#[derive(Clone)]
pub struct Capabilities {
    pub classifier: DynLlmClient,
    pub generator: DynLlmClient,
    pub evaluator: DynLlmClient,
    pub scorer: DynLlmClient,
    pub speech: Option<DynSpeechToText>,
}

impl Capabilities {
    /// 所有文本能力共用同一个客户端
    pub fn shared(client: DynLlmClient) -> Self {
        Self {
            classifier: client.clone(),
            generator: client.clone(),
            evaluator: client.clone(),
            scorer: client,
            speech: None,
        }
    }

    pub fn with_speech(mut self, speech: DynSpeechToText) -> Self {
        self.speech = Some(speech);
        self
    }

    /// 按配置创建 HTTP 客户端；缺少凭据时报错
    #[cfg(feature = "openai-client")]
    pub fn from_settings(settings: &Settings) -> crate::error::Result<Self> {
        use crate::config::{ModelSpec, Provider};
        use crate::llm::{ChatClient, WhisperClient};

        let chat = |spec: &ModelSpec| -> crate::error::Result<DynLlmClient> {
            let key = settings.credentials.for_provider(spec.provider)?;
            let client = ChatClient::new(spec.provider, key, spec.model.clone(), spec.endpoint.clone())?;
            Ok(Arc::new(client))
        };
        let models = &settings.models;
        let speech = match settings.credentials.for_provider(Provider::OpenAi) {
            Ok(key) => {
                let spec = &models.speech_to_text;
                let client = WhisperClient::new(key, spec.model.clone(), spec.endpoint.clone())?;
                Some(Arc::new(client) as DynSpeechToText)
            }
            Err(_) => None,
        };

        Ok(Self {
            classifier: chat(&models.abuse_detection)?,
            generator: chat(&models.summarization)?,
            evaluator: chat(&models.critic)?,
            scorer: chat(&models.qa_scoring)?,
            speech,
        })
    }
}

/// 按配置创建全部内置 Agent
pub fn build_agents(settings: &Settings, capabilities: Capabilities) -> AgentRegistry {
    let policy = &settings.policy;
    let models = &settings.models;
    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(InputValidator::new(policy.clone())),
        Arc::new(IntakeAgent::new(policy.words_per_minute)),
        Arc::new(TranscriptionAgent::new(
            capabilities.speech,
            models.speech_to_text.model.clone(),
        )),
        Arc::new(AbuseDetectionAgent::new(
            capabilities.classifier,
            models.abuse_detection.clone(),
            policy,
        )),
        Arc::new(SummarizationAgent::new(
            capabilities.generator,
            models.summarization.clone(),
        )),
        Arc::new(CriticAgent::new(
            capabilities.evaluator,
            models.critic.clone(),
            policy,
        )),
        Arc::new(QaScoringAgent::new(
            capabilities.scorer,
            models.qa_scoring.clone(),
        )),
    ];

    let mut registry = AgentRegistry::new();
    for agent in agents {
        register_agent(agent, &mut registry);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::NodeId;
    use crate::llm::ScriptedClient;

    #[test]
    fn test_build_agents_registers_every_node() {
        let capabilities = Capabilities::shared(Arc::new(ScriptedClient::default()));
        let registry = build_agents(&Settings::default(), capabilities);
        for node in NodeId::ALL {
            assert_eq!(registry[&node].node(), node);
        }
    }

    #[cfg(feature = "openai-client")]
    #[test]
    fn test_from_settings_requires_credentials() {
        let settings = Settings::default();
        assert!(matches!(
            Capabilities::from_settings(&settings),
            Err(crate::error::AnalysisError::MissingCredential(_))
        ));
    }
}
