use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::{LlmClient, SpeechToText};
use super::types::{LlmRequest, LlmResponse, SpeechTranscript};
use crate::error::{AnalysisError, Result};

/// 离线客户端：按顺序回放预设响应，并记录收到的请求
///
/// 响应耗尽后重复最后一条；用于测试与演练。
#[derive(Clone, Default)]
pub struct ScriptedClient {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    last: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
}

impl ScriptedClient {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::default();
        client
            .responses
            .lock()
            .extend(responses.into_iter().map(|r| Ok(r.into())));
        client
    }

    /// 单条响应，反复返回
    pub fn always(response: impl Into<String>) -> Self {
        Self::new([response.into()])
    }

    /// 追加一次失败调用
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        self.responses
            .lock()
            .push_back(Err(AnalysisError::Capability(message.into())));
        self
    }

    pub fn push_response(&self, response: impl Into<String>) -> &Self {
        self.responses.lock().push_back(Ok(response.into()));
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().push(request);
        let next = self.responses.lock().pop_front();
        match next {
            Some(Ok(content)) => {
                *self.last.lock() = Some(content.clone());
                Ok(LlmResponse::text(content))
            }
            Some(Err(err)) => Err(err),
            None => self
                .last
                .lock()
                .clone()
                .map(LlmResponse::text)
                .ok_or_else(|| AnalysisError::Capability("scripted client has no responses".into())),
        }
    }
}

/// 离线语音转写：返回固定结果
#[derive(Clone)]
pub struct ScriptedSpeech {
    transcript: SpeechTranscript,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedSpeech {
    pub fn new(transcript: SpeechTranscript) -> Self {
        Self {
            transcript,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl SpeechToText for ScriptedSpeech {
    async fn transcribe(&self, audio: &[u8], _file_name: Option<&str>) -> Result<SpeechTranscript> {
        *self.calls.lock() += 1;
        if audio.is_empty() {
            return Err(AnalysisError::Capability("empty audio payload".into()));
        }
        Ok(self.transcript.clone())
    }
}
