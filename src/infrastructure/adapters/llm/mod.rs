//! LLM Adapter - 语言模型客户端实现

mod fake_llm_client;
mod http_llm_client;

pub use fake_llm_client::FakeLlmClient;
pub use http_llm_client::*;
