// 运行时执行引擎模块

mod analyzer;
mod executor;
mod types;

pub use analyzer::CallAnalyzer;
pub use executor::{WorkflowExecutor, DEFAULT_MAX_STEPS};
pub use types::{FlowExecution, StepEvent};
