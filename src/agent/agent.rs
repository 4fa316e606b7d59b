use async_trait::async_trait;

use crate::error::Result;
use crate::flow::NodeId;
use crate::state::CallState;

/// 不调用外部模型时写入 `models_used` 的标记
pub mod sentinel {
    pub const INPUT_VALIDATOR: &str = "input-validator";
    pub const RULE_BASED: &str = "rule-based";
    pub const PASS_THROUGH: &str = "pass-through";
    pub const SKIPPED: &str = "skipped";
}

/// Agent 能力约定
///
/// 每次调用恰好追加一项执行路径与一项模型记录；可恢复的失败写入
/// `state.errors` 并让自己负责的字段保持为空。只有配置或前置条件
/// 违例才返回 `Err`。
#[async_trait]
pub trait Agent: Send + Sync {
    fn node(&self) -> NodeId;

    fn name(&self) -> &'static str {
        self.node().as_str()
    }

    async fn run(&self, state: &mut CallState) -> Result<()>;
}
