use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::client::{LlmClient, SpeechToText};
use super::types::{LlmRequest, LlmResponse, SpeechSegment, SpeechTranscript};
use crate::config::Provider;
use crate::error::{AnalysisError, Result};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 2048;

/// HTTP 客户端：连接池 + 超时，调用超时交给客户端本身
fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(300))
        .build()
        .map_err(|e| AnalysisError::Config(format!("failed to build HTTP client: {}", e)))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated, {} bytes)", &text[..end], text.len())
}

/// 对话模型客户端（OpenAI chat completions / Anthropic messages）
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    provider: Provider,
}

impl ChatClient {
    pub fn new(
        provider: Provider,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: Option<String>,
    ) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| match provider {
            Provider::OpenAi => OPENAI_BASE_URL.to_string(),
            Provider::Anthropic => ANTHROPIC_BASE_URL.to_string(),
        });
        Ok(Self {
            client: create_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            provider,
        })
    }

    fn openai_body(&self, request: &LlmRequest) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.user }));
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature,
        });
        if request.json_output {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }

    fn anthropic_body(&self, request: &LlmRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
            "temperature": request.temperature,
            "messages": [{ "role": "user", "content": request.user }],
        });
        if let Some(system) = &request.system {
            body["system"] = json!(system);
        }
        body
    }
}

#[async_trait]
impl LlmClient for ChatClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let builder = match self.provider {
            Provider::OpenAi => self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&self.openai_body(&request)),
            Provider::Anthropic => self
                .client
                .post(format!("{}/messages", self.base_url))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&self.anthropic_body(&request)),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| AnalysisError::Capability(format!("HTTP request error: {}", e)))?;
        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AnalysisError::Capability(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AnalysisError::Capability(format!(
                "request failed with status {}: {}",
                status,
                truncate(&response_text, 500)
            )));
        }

        let payload: Value = serde_json::from_str(&response_text).map_err(|e| {
            AnalysisError::Capability(format!(
                "response parse error: {} (body: {})",
                e,
                truncate(&response_text, 500)
            ))
        })?;

        let content = match self.provider {
            Provider::OpenAi => payload["choices"][0]["message"]["content"].as_str(),
            Provider::Anthropic => payload["content"][0]["text"].as_str(),
        }
        .ok_or_else(|| AnalysisError::Capability("missing message content".into()))?;

        debug!(chars = content.len(), "model response received");
        Ok(LlmResponse {
            content: content.to_string(),
            metadata: Some(payload["usage"].clone()),
        })
    }
}

#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Whisper 语音转写客户端
#[derive(Clone)]
pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl WhisperClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: Option<String>) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            base_url: base_url
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    #[instrument(skip(self, audio), fields(model = %self.model, bytes = audio.len()))]
    async fn transcribe(&self, audio: &[u8], file_name: Option<&str>) -> Result<SpeechTranscript> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(file_name.unwrap_or("audio.wav").to_string());
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AnalysisError::Capability(format!("transcription request error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Capability(format!(
                "transcription failed with status {}: {}",
                status,
                truncate(&body, 500)
            )));
        }

        let payload: WhisperResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Capability(format!("transcription parse error: {}", e)))?;

        Ok(SpeechTranscript {
            text: payload.text,
            language: payload.language,
            segments: payload
                .segments
                .into_iter()
                .map(|s| SpeechSegment {
                    start: s.start,
                    end: s.end,
                    text: s.text.trim().to_string(),
                    speaker: None,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_body_requests_json_object() {
        let client = ChatClient::new(Provider::OpenAi, "key", "gpt-4o-mini", None).unwrap();
        let body = client.openai_body(&LlmRequest::new("sys", "hi").expect_json());
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn test_anthropic_body_moves_system_prompt() {
        let client = ChatClient::new(Provider::Anthropic, "key", "claude", None).unwrap();
        let body = client.anthropic_body(&LlmRequest::new("sys", "hi"));
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "ééééé";
        let out = truncate(text, 3);
        assert!(out.starts_with("é"));
    }
}
