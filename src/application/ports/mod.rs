//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod event_sink;
mod llm_engine;
mod novel_exporter;
mod novel_store;

pub use event_sink::{PipelineEvent, PipelineEventSink};
pub use llm_engine::{
    AgentKind, ChatMessage, GenerateRequest, GenerateResponse, LlmEnginePort, LlmError,
    MessageRole, OutputSchema,
};
pub use novel_exporter::{ExportError, NovelExporterPort};
pub use novel_store::{NovelStorePort, StoreError};
