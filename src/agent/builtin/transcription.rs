use async_trait::async_trait;
use tracing::{debug, info};

use crate::agent::agent::{sentinel, Agent};
use crate::error::{AnalysisError, Result};
use crate::flow::NodeId;
use crate::llm::{DynSpeechToText, SpeechTranscript};
use crate::state::{CallState, InputKind, TranscriptData, TranscriptSegment};

/// 语音转写服务不返回置信度时使用的固定值
pub const SPEECH_CONFIDENCE: f64 = 0.95;

/// 文本输入直接透传；音频输入交给语音转写能力
pub struct TranscriptionAgent {
    speech: Option<DynSpeechToText>,
    speech_model: String,
}

impl TranscriptionAgent {
    pub fn new(speech: Option<DynSpeechToText>, speech_model: impl Into<String>) -> Self {
        Self {
            speech,
            speech_model: speech_model.into(),
        }
    }

    fn pass_through(state: &mut CallState) {
        state.transcript = Some(TranscriptData {
            segments: Vec::new(),
            full_text: state.raw_input.clone(),
            language: "en".to_string(),
            confidence: 1.0,
        });
        state.record_step(NodeId::Transcription, sentinel::PASS_THROUGH);
    }
}

fn to_transcript(result: SpeechTranscript) -> TranscriptData {
    TranscriptData {
        segments: result
            .segments
            .into_iter()
            .map(|s| TranscriptSegment {
                start: s.start,
                end: s.end,
                text: s.text.trim().to_string(),
                speaker: s.speaker,
            })
            .collect(),
        full_text: result.text.trim().to_string(),
        language: result.language.unwrap_or_else(|| "en".to_string()),
        confidence: SPEECH_CONFIDENCE,
    }
}

#[async_trait]
impl Agent for TranscriptionAgent {
    fn node(&self) -> NodeId {
        NodeId::Transcription
    }

    async fn run(&self, state: &mut CallState) -> Result<()> {
        if state.input_kind == InputKind::Transcript {
            debug!("text input, passing through");
            Self::pass_through(state);
            return Ok(());
        }

        let audio = match state.audio.as_deref() {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(AnalysisError::MissingAudio),
        };
        let speech = self.speech.as_ref().ok_or_else(|| {
            AnalysisError::MissingCredential("no speech-to-text capability configured".into())
        })?;

        match speech.transcribe(audio, state.file_name.as_deref()).await {
            Ok(result) => {
                let transcript = to_transcript(result);
                info!(
                    segments = transcript.segments.len(),
                    language = %transcript.language,
                    "audio transcribed"
                );
                state.transcript = Some(transcript);
            }
            Err(e) => state.record_error(format!("Transcription failed: {}", e)),
        }
        state.record_step(NodeId::Transcription, self.speech_model.clone());
        Ok(())
    }
}
