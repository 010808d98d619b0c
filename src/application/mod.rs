//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（LlmEngine、NovelStore、NovelExporter、PipelineEventSink）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - generation: 结构化生成（超时、取消、解码校验）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod generation;
pub mod policy;
pub mod ports;
pub mod prompts;
pub mod queries;

// Re-exports
pub use commands::{
    CreateNovel, DevelopCharacters, DraftChapter, ExportNovel, GenerateOutline, SummarizeChapter,
    WriteChapter,
    // Handlers
    handlers::{
        render_manuscript, CreateNovelHandler, DevelopCharactersHandler, DraftChapterHandler,
        ExportNovelHandler, GenerateOutlineHandler, NovelReport, SummarizeChapterHandler,
        WriteChapterHandler,
    },
};

pub use error::{ApplicationError, Stage};
pub use generation::{decode, StructuredGenerator, StructuredOutput};
pub use policy::WritingPolicy;

pub use ports::{
    // LLM engine
    AgentKind,
    ChatMessage,
    GenerateRequest,
    GenerateResponse,
    LlmEnginePort,
    LlmError,
    MessageRole,
    OutputSchema,
    // Store
    NovelStorePort,
    StoreError,
    // Export
    ExportError,
    NovelExporterPort,
    // Events
    PipelineEvent,
    PipelineEventSink,
};

pub use queries::{
    AssembleChapterContext, ChapterContext,
    // Handlers
    handlers::AssembleChapterContextHandler,
};
