//! Quill - 多 Agent 长篇小说生成流水线
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 大纲、角色、章节、摘要与质量评估
//!
//! 应用层 (application/):
//! - Ports: 端口定义（LlmEngine, NovelStore, NovelExporter, PipelineEventSink）
//! - Commands: 大纲、角色、分段起草、质量循环、摘要、导出
//! - Queries: 章节上下文组装
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP LLM Client, Fake LLM Client, 文件导出
//! - Memory: 单次运行的内存存储
//! - Events: 进度事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
