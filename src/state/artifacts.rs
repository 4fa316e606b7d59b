use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::call::InputKind;
use crate::error::{AnalysisError, Result};

/// 输入形态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputShape {
    Conversation,
    MultiLineText,
    SingleText,
    Empty,
    Audio,
}

/// 校验时计算的文本统计
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub word_count: usize,
    pub line_count: usize,
    pub special_char_ratio: f64,
    pub unique_word_ratio: Option<f64>,
    pub has_speaker_labels: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub confidence: f64,
    pub input_type_detected: InputShape,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub stats: TextStats,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallMetadata {
    pub call_id: String,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: Option<f64>,
    pub input_kind: InputKind,
    pub file_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub speaker: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptData {
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
    pub full_text: String,
    pub language: String,
    pub confidence: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbuseCategory {
    Profanity,
    Threat,
    Harassment,
    Discrimination,
}

impl AbuseCategory {
    /// 模型标签到规范类别；`sexual` 与 `hate_speech` 归入 discrimination，
    /// 无法识别的标签按 profanity 保留
    pub fn from_label(label: &str) -> Self {
        let label = label
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        match label.as_str() {
            "threat" => AbuseCategory::Threat,
            "harassment" => AbuseCategory::Harassment,
            "discrimination" | "sexual" | "hate_speech" => AbuseCategory::Discrimination,
            _ => AbuseCategory::Profanity,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbuseSeverity {
    Low,
    Medium,
    High,
}

impl AbuseSeverity {
    pub fn from_score(score: u8, low_max: u8, medium_max: u8) -> Self {
        if score <= low_max {
            AbuseSeverity::Low
        } else if score <= medium_max {
            AbuseSeverity::Medium
        } else {
            AbuseSeverity::High
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbuseFinding {
    pub category: AbuseCategory,
    pub severity: AbuseSeverity,
    pub score: u8,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub rationale: String,
}

impl AbuseFinding {
    pub fn requires_escalation(&self) -> bool {
        self.severity == AbuseSeverity::High
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Resolved,
    Unresolved,
    Escalated,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Resolved => "resolved",
            ResolutionStatus::Unresolved => "unresolved",
            ResolutionStatus::Escalated => "escalated",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallSummary {
    pub brief_summary: String,
    pub key_points: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    pub customer_intent: String,
    pub sentiment: Sentiment,
    pub resolution_status: ResolutionStatus,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryCritique {
    pub faithfulness_score: u8,
    pub completeness_score: u8,
    pub conciseness_score: u8,
    pub needs_revision: bool,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub revision_instructions: Option<String>,
}

impl SummaryCritique {
    /// 根据三项得分构造评审结果；任一项低于阈值即需要修订
    pub fn evaluate(
        faithfulness: u8,
        completeness: u8,
        conciseness: u8,
        threshold: u8,
        feedback: String,
        revision_instructions: Option<String>,
    ) -> Result<Self> {
        for (axis, score) in [
            ("faithfulness", faithfulness),
            ("completeness", completeness),
            ("conciseness", conciseness),
        ] {
            if !(1..=10).contains(&score) {
                return Err(AnalysisError::Capability(format!(
                    "critique {} score {} outside 1..=10",
                    axis, score
                )));
            }
        }
        let needs_revision = [faithfulness, completeness, conciseness]
            .iter()
            .any(|score| *score < threshold);
        Ok(Self {
            faithfulness_score: faithfulness,
            completeness_score: completeness,
            conciseness_score: conciseness,
            needs_revision,
            feedback,
            revision_instructions,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QaScores {
    pub empathy: f64,
    pub professionalism: f64,
    pub resolution: f64,
    pub tone: f64,
    pub overall: f64,
    #[serde(default)]
    pub comments: String,
}

impl QaScores {
    pub fn new(
        empathy: f64,
        professionalism: f64,
        resolution: f64,
        tone: f64,
        comments: String,
    ) -> Result<Self> {
        for (axis, score) in [
            ("empathy", empathy),
            ("professionalism", professionalism),
            ("resolution", resolution),
            ("tone", tone),
        ] {
            if !(0.0..=10.0).contains(&score) {
                return Err(AnalysisError::Capability(format!(
                    "QA {} score {} outside 0..=10",
                    axis, score
                )));
            }
        }
        Ok(Self {
            empathy,
            professionalism,
            resolution,
            tone,
            overall: overall_score([empathy, professionalism, resolution, tone]),
            comments,
        })
    }
}

/// 四项均值，保留一位小数（银行家舍入：8.25 -> 8.2）
pub fn overall_score(axes: [f64; 4]) -> f64 {
    let mean = axes.iter().sum::<f64>() / axes.len() as f64;
    (mean * 10.0).round_ties_even() / 10.0
}
