use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use crate::agent::agent::{sentinel, Agent};
use crate::config::PolicyConfig;
use crate::error::Result;
use crate::flow::NodeId;
use crate::state::{CallState, InputKind, InputShape, TextStats, ValidationResult};

/// 输入校验：字数、特殊字符比例、词汇重复、说话人标签、行数
pub struct InputValidator {
    policy: PolicyConfig,
}

impl InputValidator {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    pub fn validate_text(&self, raw: &str) -> ValidationResult {
        let text = raw.trim();
        if text.is_empty() {
            let issue = "No input provided".to_string();
            return ValidationResult {
                is_valid: false,
                confidence: 0.0,
                input_type_detected: InputShape::Empty,
                rejection_reason: Some(issue.clone()),
                issues: vec![issue],
                warnings: Vec::new(),
                stats: TextStats::default(),
            };
        }

        let stats = text_stats(text, self.policy.structure_check_min_words);
        let p = &self.policy;
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        if stats.word_count < p.min_words {
            issues.push(format!(
                "Input too short: {} words (minimum: {})",
                stats.word_count, p.min_words
            ));
        } else if stats.word_count > p.max_words {
            issues.push(format!(
                "Input too long: {} words (maximum: {})",
                stats.word_count, p.max_words
            ));
        }

        if !stats.has_speaker_labels && stats.word_count > p.structure_check_min_words {
            warnings.push(
                "No speaker labels detected (missing 'Speaker:' or 'Agent:' format)".to_string(),
            );
        }
        if stats.special_char_ratio > p.special_char_ratio_max {
            warnings.push(format!(
                "High special character ratio: {:.1}%",
                stats.special_char_ratio * 100.0
            ));
        }
        if let Some(ratio) = stats.unique_word_ratio {
            if ratio < p.unique_word_ratio_min {
                warnings.push(format!(
                    "Low vocabulary diversity: {:.1}% (possible spam or repetitive input)",
                    ratio * 100.0
                ));
            }
        }
        if stats.line_count < 2 && stats.word_count > p.single_line_max_words {
            warnings.push("Single-line input may not be a conversation transcript".to_string());
        }

        let input_type_detected = if stats.has_speaker_labels && stats.line_count > 1 {
            InputShape::Conversation
        } else if stats.line_count > 5 {
            InputShape::MultiLineText
        } else {
            InputShape::SingleText
        };

        let confidence = if issues.is_empty() {
            (1.0 - p.warning_penalty * warnings.len() as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        ValidationResult {
            is_valid: issues.is_empty(),
            confidence,
            input_type_detected,
            rejection_reason: (!issues.is_empty()).then(|| issues.join("; ")),
            issues,
            warnings,
            stats,
        }
    }

    pub fn validate_audio(&self, audio: Option<&[u8]>) -> ValidationResult {
        let issues = match audio {
            Some(bytes) if !bytes.is_empty() => Vec::new(),
            Some(_) => vec!["Audio payload is empty".to_string()],
            None => vec!["No audio payload provided".to_string()],
        };
        ValidationResult {
            is_valid: issues.is_empty(),
            confidence: if issues.is_empty() { 1.0 } else { 0.0 },
            input_type_detected: InputShape::Audio,
            rejection_reason: (!issues.is_empty()).then(|| issues.join("; ")),
            issues,
            warnings: Vec::new(),
            stats: TextStats::default(),
        }
    }
}

fn text_stats(text: &str, structure_check_min_words: usize) -> TextStats {
    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    let total_chars = text.chars().count();
    let special = text
        .chars()
        .filter(|c| {
            !(c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, ':' | '.' | ',' | '!' | '?' | '-' | '\''))
        })
        .count();
    let unique_word_ratio = (words.len() > structure_check_min_words).then(|| {
        let unique: HashSet<&String> = words.iter().collect();
        unique.len() as f64 / words.len() as f64
    });

    TextStats {
        word_count: words.len(),
        line_count: text.split('\n').count(),
        special_char_ratio: if total_chars == 0 {
            0.0
        } else {
            special as f64 / total_chars as f64
        },
        unique_word_ratio,
        has_speaker_labels: text.contains(':'),
    }
}

#[async_trait]
impl Agent for InputValidator {
    fn node(&self) -> NodeId {
        NodeId::Validation
    }

    async fn run(&self, state: &mut CallState) -> Result<()> {
        let result = match state.input_kind {
            InputKind::Transcript => self.validate_text(&state.raw_input),
            InputKind::Audio => self.validate_audio(state.audio.as_deref()),
        };
        debug!(
            valid = result.is_valid,
            confidence = result.confidence,
            warnings = result.warnings.len(),
            "input validated"
        );
        if !result.is_valid {
            for issue in &result.issues {
                state.record_error(format!("Input validation failed: {}", issue));
            }
        }
        state.validation = Some(result);
        state.record_step(NodeId::Validation, sentinel::INPUT_VALIDATOR);
        Ok(())
    }
}
