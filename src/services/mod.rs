// 服务模块 - 提示词、响应清理与解析

pub mod abuse_parser;
pub mod prompts;
pub mod response;

pub use abuse_parser::AbuseResponseParser;
pub use response::{clean_response, decode_structured};
