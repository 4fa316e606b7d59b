use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::state::{AbuseCategory, AbuseFinding, AbuseSeverity};

/// 缺少 SEVERITY 时的默认分数（medium）
pub const DEFAULT_SEVERITY_SCORE: u8 = 5;

static NO_ABUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)NO[_\s]ABUSE[_\s]DETECTED").expect("valid no-abuse pattern"));
// 记录只在行首的 TYPE: 处切分，列表符号与加粗可选
static RECORD_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t>*-]*(?:\d+[.)][ \t*]*)?TYPE:").expect("valid record pattern")
});
static TYPE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TYPE:[\s*\[]*([a-z][a-z_ \t-]*)").expect("valid type pattern"));
static FIELD_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:SEVERITY|TEXT|CONTEXT)\b").expect("valid keyword pattern"));
static SEVERITY_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SEVERITY:[\s*\[]*(\d+)").expect("valid severity pattern"));
static TEXT_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bTEXT:[ \t*]*").expect("valid text pattern"));
static CONTEXT_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)CONTEXT:[ \t*]*(.+)").expect("valid context pattern"));

/// 滥用检测响应解析器
///
/// 尽力而为的文本抽取：逐条解析，坏记录单独丢弃，不影响其他记录。
#[derive(Clone, Copy, Debug)]
pub struct AbuseResponseParser {
    low_max: u8,
    medium_max: u8,
}

impl AbuseResponseParser {
    pub fn new(low_max: u8, medium_max: u8) -> Self {
        Self {
            low_max,
            medium_max,
        }
    }

    pub fn parse(&self, response: &str) -> Vec<AbuseFinding> {
        if NO_ABUSE.is_match(response) {
            return Vec::new();
        }

        let starts: Vec<usize> = RECORD_START.find_iter(response).map(|m| m.start()).collect();
        starts
            .iter()
            .enumerate()
            .filter_map(|(i, &start)| {
                let end = starts.get(i + 1).copied().unwrap_or(response.len());
                let record = &response[start..end];
                let finding = self.parse_record(record);
                if finding.is_none() {
                    debug!(record = %record.trim(), "skipping malformed abuse record");
                }
                finding
            })
            .collect()
    }

    fn parse_record(&self, record: &str) -> Option<AbuseFinding> {
        let label = TYPE_FIELD.captures(record)?.get(1)?.as_str();
        let label = FIELD_KEYWORD.split(label).next().unwrap_or_default().trim();
        if label.is_empty() {
            return None;
        }
        let category = AbuseCategory::from_label(label);

        // 捕获组只含数字，解析失败只可能是溢出
        let score = SEVERITY_FIELD
            .captures(record)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
            .map(|n| n.clamp(1, 10) as u8)
            .unwrap_or(DEFAULT_SEVERITY_SCORE);

        let evidence = TEXT_FIELD
            .find(record)
            .and_then(|m| extract_quote(&record[m.end()..]))
            .map(|quote| vec![quote])
            .unwrap_or_default();

        let rationale = CONTEXT_FIELD
            .captures(record)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        Some(AbuseFinding {
            category,
            severity: AbuseSeverity::from_score(score, self.low_max, self.medium_max),
            score,
            evidence,
            rationale,
        })
    }
}

/// 取出 `TEXT:` 之后的引文；双引号可跨行，其余情况只取当前行
fn extract_quote(rest: &str) -> Option<String> {
    let rest = rest.trim_start();
    let quote = if let Some(body) = rest.strip_prefix('"') {
        body.find('"').map(|end| &body[..end])
    } else if let Some(body) = rest.strip_prefix('\u{201c}') {
        body.find('\u{201d}').map(|end| &body[..end])
    } else {
        None
    };

    let quote = match quote {
        Some(quote) => quote,
        None => {
            let line = rest.lines().next().unwrap_or_default().trim();
            line.strip_prefix('\'')
                .map(|l| l.strip_suffix('\'').unwrap_or(l))
                .unwrap_or(line)
        }
    };

    let quote = quote.trim();
    if quote.is_empty() || quote.to_uppercase().starts_with("CONTEXT:") {
        None
    } else {
        Some(quote.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> AbuseResponseParser {
        AbuseResponseParser::new(3, 6)
    }

    #[test]
    fn test_sentinel_wins_over_records() {
        let response = "TYPE: profanity\nSEVERITY: 5\nTEXT: \"damn\"\n\nActually: NO_ABUSE_DETECTED";
        assert!(parser().parse(response).is_empty());
    }

    #[test]
    fn test_single_quote_excerpt_keeps_apostrophe() {
        let response = "TYPE: harassment\nSEVERITY: 5\nTEXT: 'you're an idiot'\nCONTEXT: insult";
        let findings = parser().parse(response);
        assert_eq!(findings[0].evidence, vec!["you're an idiot".to_string()]);
    }

    #[test]
    fn test_missing_text_yields_empty_evidence() {
        let findings = parser().parse("TYPE: threat\nSEVERITY: 8\nCONTEXT: legal threat");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].evidence.is_empty());
        assert_eq!(findings[0].severity, AbuseSeverity::High);
        assert_eq!(findings[0].rationale, "legal threat");
    }

    #[test]
    fn test_markdown_bold_fields() {
        let findings = parser().parse("**TYPE:** profanity\n**SEVERITY:** 2\n**TEXT:** \"crap\"");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, AbuseSeverity::Low);
        assert_eq!(findings[0].evidence, vec!["crap".to_string()]);
    }

    #[test]
    fn test_mixed_records_keep_only_well_formed() {
        let response = "Here is my review of the call.\n\n\
            TYPE: threat\nSEVERITY: 9\nTEXT: \"I will find you\"\nCONTEXT: explicit threat\n\n\
            ---\n\
            TYPE: ???\nSEVERITY: 4\nTEXT: \"whatever\"\n\n\
            TYPE: hate speech\nSEVERITY: 8\nTEXT: \"people like you\"\nCONTEXT: targets a group\n\n\
            TYPE:\nSEVERITY: 3\n\n\
            TYPE: insult\nTEXT: \"moron\"\nCONTEXT: name calling\n";
        let findings = parser().parse(response);

        let categories: Vec<_> = findings.iter().map(|f| f.category).collect();
        assert_eq!(
            categories,
            vec![
                AbuseCategory::Threat,
                AbuseCategory::Discrimination,
                AbuseCategory::Profanity,
            ]
        );
        let scores: Vec<_> = findings.iter().map(|f| f.score).collect();
        assert_eq!(scores, vec![9, 8, DEFAULT_SEVERITY_SCORE]);
        assert_eq!(findings[1].evidence, vec!["people like you".to_string()]);
        assert_eq!(findings[1].rationale, "targets a group");
        assert_eq!(findings[2].severity, AbuseSeverity::Medium);
        assert_eq!(findings[2].evidence, vec!["moron".to_string()]);
    }

    #[test]
    fn test_inline_type_word_does_not_split_record() {
        let response = "TYPE: harassment\nSEVERITY: 5\nTEXT: \"shut up\"\n\
            CONTEXT: the type: of insult was personal\n\
            TYPE: profanity\nSEVERITY: 2\nTEXT: \"crap\"";
        let findings = parser().parse(response);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].category, AbuseCategory::Harassment);
        assert_eq!(findings[0].rationale, "the type: of insult was personal");
        assert_eq!(findings[1].category, AbuseCategory::Profanity);
    }

    #[test]
    fn test_oversized_severity_clamps_high() {
        let findings = parser().parse("TYPE: threat\nSEVERITY: 99999999999\nTEXT: \"or else\"");
        assert_eq!(findings[0].score, 10);
        assert_eq!(findings[0].severity, AbuseSeverity::High);
    }

    #[test]
    fn test_numbered_list_records() {
        let response = "1. TYPE: profanity\n   SEVERITY: 3\n2. TYPE: threat\n   SEVERITY: 7";
        let findings = parser().parse(response);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[1].category, AbuseCategory::Threat);
        assert_eq!(findings[1].severity, AbuseSeverity::High);
    }
}
