use crate::error::{AnalysisError, Result};
use std::env;

/// 环境变量配置管理
///
/// 只在启动阶段使用；Agent 通过构造参数拿到配置，不直接读取环境变量。
pub struct EnvConfig;

impl EnvConfig {
    /// 解析凭据值
    ///
    /// 优先级：
    /// 1. `${VAR_NAME}` 形式：读取对应环境变量
    /// 2. 空值：读取 `default_env_var`
    /// 3. 其他：原样返回
    pub fn resolve_credential(value: &str, default_env_var: &str) -> Result<String> {
        if value.starts_with("${") && value.ends_with('}') {
            let env_var_name = &value[2..value.len() - 1];
            Self::get_env(env_var_name)
        } else if value.is_empty() {
            Self::get_env(default_env_var)
        } else {
            Ok(value.to_string())
        }
    }

    /// 从环境变量获取值，缺失时视为凭据缺失
    pub fn get_env(key: &str) -> Result<String> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(AnalysisError::MissingCredential(key.to_string())),
        }
    }

    /// 检查是否启用调试模式
    pub fn is_debug_mode() -> bool {
        env::var("CALLFLOW_DEBUG").is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_credential_direct() {
        let result = EnvConfig::resolve_credential("sk-1234567890abcdef", "CALLFLOW_TEST_UNUSED");
        assert_eq!(result.unwrap(), "sk-1234567890abcdef");
    }

    #[test]
    fn test_resolve_credential_env_reference() {
        env::set_var("CALLFLOW_TEST_REF_KEY", "from_env");
        let result = EnvConfig::resolve_credential("${CALLFLOW_TEST_REF_KEY}", "CALLFLOW_FALLBACK");
        assert_eq!(result.unwrap(), "from_env");
        env::remove_var("CALLFLOW_TEST_REF_KEY");
    }

    #[test]
    fn test_missing_env_is_missing_credential() {
        env::remove_var("CALLFLOW_TEST_ABSENT_KEY");
        let result = EnvConfig::resolve_credential("", "CALLFLOW_TEST_ABSENT_KEY");
        assert!(matches!(result, Err(AnalysisError::MissingCredential(key)) if key == "CALLFLOW_TEST_ABSENT_KEY"));
    }
}
