use std::sync::Arc;

use async_trait::async_trait;

use super::types::{LlmRequest, LlmResponse, SpeechTranscript};
use crate::error::Result;

/// 文本类模型能力：分类、生成、评审、评分共用
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;
}

pub type DynLlmClient = Arc<dyn LlmClient>;

/// 语音转文字能力
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8], file_name: Option<&str>) -> Result<SpeechTranscript>;
}

pub type DynSpeechToText = Arc<dyn SpeechToText>;
