//! LLM Engine Port - 语言模型推理抽象
//!
//! 只约定调用契约：按顺序的角色消息 + 期望的输出结构 in，结构化 JSON 文本 out。
//! 具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// LLM 调用错误
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response does not match schema {schema}: {reason}")]
    SchemaMismatch { schema: &'static str, reason: String },
}

impl LlmError {
    pub fn schema_mismatch(schema: &'static str, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            schema,
            reason: reason.into(),
        }
    }
}

/// 参与生成的 Agent 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// 大纲
    Outline,
    /// 角色档案
    Character,
    /// 整章写作（用于扩写）
    ChapterWriter,
    /// 分段写作
    SectionWriter,
    /// 章节摘要
    Summary,
    /// 质量评估
    QualityEvaluator,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Outline => "outline_agent",
            AgentKind::Character => "character_agent",
            AgentKind::ChapterWriter => "chapter_writer_agent",
            AgentKind::SectionWriter => "section_writer_agent",
            AgentKind::Summary => "summary_agent",
            AgentKind::QualityEvaluator => "quality_evaluator",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// 期望的输出结构
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// 结构名称（如 `chapter_section`）
    pub name: &'static str,
    /// JSON Schema
    pub schema: serde_json::Value,
}

/// 生成请求
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub agent: AgentKind,
    pub messages: Vec<ChatMessage>,
    pub output: OutputSchema,
}

impl GenerateRequest {
    /// 所有消息的字符数，用于日志
    pub fn prompt_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }

    /// 最后一条用户消息
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// 生成响应
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// 模型返回的 JSON 文本（未解码）
    pub content: String,
}

/// LLM Engine Port
///
/// 外部语言模型服务的抽象接口
#[async_trait]
pub trait LlmEnginePort: Send + Sync {
    /// 执行一次结构化生成
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError>;

    /// 检查模型服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
