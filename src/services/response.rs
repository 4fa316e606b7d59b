use serde::de::DeserializeOwned;

use crate::error::{AnalysisError, Result};

const JSON_CODE_BLOCK_START: &str = "```json";
const CODE_BLOCK_START: &str = "```";
const CODE_BLOCK_END: &str = "```";

/// 清理响应内容，提取 JSON（处理代码块包裹的情况）
pub fn clean_response(response: &str) -> &str {
    let fence = if response.contains(JSON_CODE_BLOCK_START) {
        JSON_CODE_BLOCK_START
    } else {
        CODE_BLOCK_START
    };
    if let Some(start) = response.find(fence) {
        let body_start = start + fence.len();
        if let Some(end) = response[body_start..].find(CODE_BLOCK_END) {
            return response[body_start..body_start + end].trim();
        }
    }

    // 模型偶尔在 JSON 前后夹带说明文字
    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => response.trim(),
    }
}

/// 把模型输出解码为结构化类型
pub fn decode_structured<T: DeserializeOwned>(response: &str, what: &str) -> Result<T> {
    serde_json::from_str(clean_response(response)).map_err(|e| {
        AnalysisError::Serialization(format!("malformed {} response: {}", what, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_clean_response_strips_json_fence() {
        let response = "```json\n{\"route\": \"urgent\"}\n```";
        assert_eq!(clean_response(response), "{\"route\": \"urgent\"}");
    }

    #[test]
    fn test_clean_response_strips_surrounding_prose() {
        let response = "Here is the evaluation: {\"a\": 1} Hope it helps.";
        assert_eq!(clean_response(response), "{\"a\": 1}");
    }

    #[test]
    fn test_decode_structured_reports_context() {
        let err = decode_structured::<Value>("not json", "summary").unwrap_err();
        assert!(err.to_string().contains("malformed summary response"));
    }
}
