// 模型能力模块 - 外部协作方接口

pub mod client;
#[cfg(feature = "openai-client")]
pub mod http;
pub mod scripted;
pub mod types;

pub use client::{DynLlmClient, DynSpeechToText, LlmClient, SpeechToText};
#[cfg(feature = "openai-client")]
pub use http::{ChatClient, WhisperClient};
pub use scripted::{ScriptedClient, ScriptedSpeech};
pub use types::{LlmRequest, LlmResponse, SpeechSegment, SpeechTranscript};
