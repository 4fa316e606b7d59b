use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::env::EnvConfig;
use crate::error::{AnalysisError, Result};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// 分析流程的策略常量（唯一来源）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub min_words: usize,
    pub max_words: usize,
    pub words_per_minute: f64,
    /// 修订上限：计数达到该值后不再回到 summarization
    pub max_revisions: u32,
    /// 任一维度低于该分数即要求修订
    pub rework_threshold: u8,
    pub severity_low_max: u8,
    pub severity_medium_max: u8,
    pub special_char_ratio_max: f64,
    pub unique_word_ratio_min: f64,
    /// 超过该词数才检查说话人标签与词汇重复
    pub structure_check_min_words: usize,
    pub single_line_max_words: usize,
    pub warning_penalty: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_words: 10,
            max_words: 5000,
            words_per_minute: 150.0,
            max_revisions: 3,
            rework_threshold: 7,
            severity_low_max: 3,
            severity_medium_max: 6,
            special_char_ratio_max: 0.1,
            unique_word_ratio_min: 0.5,
            structure_check_min_words: 20,
            single_line_max_words: 50,
            warning_penalty: 0.1,
        }
    }
}

impl PolicyConfig {
    /// 执行步数上限：前四个节点，每轮摘要加评审两步（多留一轮），最后 QA 一步
    pub fn step_budget(&self) -> u32 {
        self.max_revisions
            .saturating_add(1)
            .saturating_mul(2)
            .saturating_add(5)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_words > self.max_words {
            return Err(AnalysisError::Config(format!(
                "min_words {} exceeds max_words {}",
                self.min_words, self.max_words
            )));
        }
        if self.words_per_minute <= 0.0 {
            return Err(AnalysisError::Config(
                "words_per_minute must be positive".to_string(),
            ));
        }
        if self.severity_low_max >= self.severity_medium_max {
            return Err(AnalysisError::Config(format!(
                "severity buckets out of order: low<={} medium<={}",
                self.severity_low_max, self.severity_medium_max
            )));
        }
        if !(1..=10).contains(&self.rework_threshold) {
            return Err(AnalysisError::Config(format!(
                "rework_threshold {} outside 1..=10",
                self.rework_threshold
            )));
        }
        Ok(())
    }
}

/// 单个模型能力的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub model: String,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.2
}

impl ModelSpec {
    pub fn openai(model: &str, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            provider: Provider::OpenAi,
            endpoint: None,
            temperature,
        }
    }

    pub fn anthropic(model: &str, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            provider: Provider::Anthropic,
            endpoint: None,
            temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub abuse_detection: ModelSpec,
    pub summarization: ModelSpec,
    pub critic: ModelSpec,
    pub qa_scoring: ModelSpec,
    pub speech_to_text: ModelSpec,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            abuse_detection: ModelSpec::openai("gpt-4o-mini", 0.0),
            summarization: ModelSpec::openai("gpt-4o-mini", 0.2),
            critic: ModelSpec::anthropic("claude-sonnet-4-20250514", 0.0),
            qa_scoring: ModelSpec::openai("gpt-4o-mini", 0.2),
            speech_to_text: ModelSpec::openai("whisper-1", 0.0),
        }
    }
}

/// 凭据；支持 `${ENV_VAR}` 引用
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    pub fn for_provider(&self, provider: Provider) -> Result<String> {
        let (value, env_var) = match provider {
            Provider::OpenAi => (self.openai_api_key.as_deref(), OPENAI_API_KEY),
            Provider::Anthropic => (self.anthropic_api_key.as_deref(), ANTHROPIC_API_KEY),
        };
        value
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| AnalysisError::MissingCredential(env_var.to_string()))
    }
}

/// 顶层配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub policy: PolicyConfig,
    pub models: ModelConfig,
    pub credentials: Credentials,
}

impl Settings {
    /// 从 JSON 文件读取；不解析凭据
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!("failed to read `{}`: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(raw)
            .map_err(|e| AnalysisError::Config(format!("invalid settings: {}", e)))?;
        settings.policy.validate()?;
        Ok(settings)
    }

    /// 启动入口：可选配置文件 + 环境变量中的凭据
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.resolve_credentials();
        Ok(settings)
    }

    /// 将 `${VAR}` 引用与缺省值替换为环境变量中的实际值；无法解析的保持为空
    pub fn resolve_credentials(&mut self) {
        let openai = self.credentials.openai_api_key.take().unwrap_or_default();
        self.credentials.openai_api_key =
            EnvConfig::resolve_credential(&openai, OPENAI_API_KEY).ok();
        let anthropic = self.credentials.anthropic_api_key.take().unwrap_or_default();
        self.credentials.anthropic_api_key =
            EnvConfig::resolve_credential(&anthropic, ANTHROPIC_API_KEY).ok();
    }
}
