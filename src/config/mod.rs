// 配置模块 - 策略常量、模型与凭据

mod env;
mod settings;

pub use env::EnvConfig;
pub use settings::{
    Credentials, ModelConfig, ModelSpec, PolicyConfig, Provider, Settings, ANTHROPIC_API_KEY,
    OPENAI_API_KEY,
};
