use serde::{Deserialize, Serialize};
use tracing::warn;

use super::artifacts::{
    AbuseFinding, CallMetadata, CallSummary, QaScores, SummaryCritique, TranscriptData,
    ValidationResult,
};
use super::path::PathEntry;
use crate::flow::NodeId;

/// 输入类型
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Transcript,
    Audio,
}

/// 一次分析请求的输入
#[derive(Clone, Debug, Default)]
pub struct CallInput {
    pub raw_input: String,
    pub audio: Option<Vec<u8>>,
    pub kind: InputKind,
    pub file_name: Option<String>,
}

impl CallInput {
    pub fn transcript(text: impl Into<String>) -> Self {
        Self {
            raw_input: text.into(),
            ..Default::default()
        }
    }

    pub fn audio(bytes: Vec<u8>) -> Self {
        Self {
            audio: Some(bytes),
            kind: InputKind::Audio,
            ..Default::default()
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// 贯穿整个工作流的共享状态
///
/// 每次分析创建一个实例，遍历期间只由执行器持有并交给当前 Agent 修改。
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CallState {
    pub raw_input: String,
    #[serde(default, with = "audio_base64", skip_serializing_if = "Option::is_none")]
    pub audio: Option<Vec<u8>>,
    pub input_kind: InputKind,
    #[serde(default)]
    pub file_name: Option<String>,

    #[serde(default)]
    pub validation: Option<ValidationResult>,
    #[serde(default)]
    pub metadata: Option<CallMetadata>,
    #[serde(default)]
    pub transcript: Option<TranscriptData>,
    #[serde(default)]
    pub abuse_findings: Option<Vec<AbuseFinding>>,
    #[serde(default)]
    pub summary: Option<CallSummary>,
    #[serde(default)]
    pub critique: Option<SummaryCritique>,
    #[serde(default)]
    pub qa_scores: Option<QaScores>,

    #[serde(default)]
    pub execution_path: Vec<PathEntry>,
    #[serde(default)]
    pub models_used: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub revision_count: u32,
    #[serde(default)]
    pub current_agent: Option<NodeId>,
    #[serde(default)]
    pub needs_revision: bool,
}

impl CallState {
    pub fn new(input: CallInput) -> Self {
        Self {
            raw_input: input.raw_input,
            audio: input.audio,
            input_kind: input.kind,
            file_name: input.file_name,
            ..Default::default()
        }
    }

    pub fn from_transcript(text: impl Into<String>) -> Self {
        Self::new(CallInput::transcript(text))
    }

    pub fn from_audio(bytes: Vec<u8>) -> Self {
        Self::new(CallInput::audio(bytes))
    }

    /// 记录一次 Agent 调用：执行路径与模型各追加一项
    pub fn record_step(&mut self, node: NodeId, model: impl Into<String>) {
        self.execution_path.push(PathEntry::new(node));
        self.models_used.push(model.into());
    }

    /// 同 `record_step`，路径项带尝试次数标记
    pub fn record_attempt(&mut self, node: NodeId, attempt: u32, model: impl Into<String>) {
        self.execution_path.push(PathEntry::attempt(node, attempt));
        self.models_used.push(model.into());
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "recorded analysis error");
        self.errors.push(message);
    }

    pub fn is_valid(&self) -> bool {
        self.validation.as_ref().is_some_and(|v| v.is_valid)
    }

    pub fn word_count(&self) -> usize {
        self.raw_input.split_whitespace().count()
    }

    /// 不带尝试标记的节点名序列
    pub fn path_names(&self) -> Vec<&'static str> {
        self.execution_path.iter().map(|e| e.node.as_str()).collect()
    }

    /// 带尝试标记的路径标签，如 `summarization:v2`
    pub fn path_labels(&self) -> Vec<String> {
        self.execution_path.iter().map(|e| e.label()).collect()
    }

    pub fn invocations_of(&self, node: NodeId) -> usize {
        self.execution_path.iter().filter(|e| e.node == node).count()
    }

    /// 无错误且摘要与 QA 评分齐全
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.summary.is_some() && self.qa_scores.is_some()
    }
}

mod audio_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => s.serialize_some(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(d)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
