//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ExportError, LlmError, StoreError};
use crate::domain::novel::ChapterNumber;

/// 生成阶段，用于错误上下文和日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Characters,
    Section,
    Expansion,
    Evaluation,
    Summary,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Characters => "characters",
            Stage::Section => "section",
            Stage::Expansion => "expansion",
            Stage::Evaluation => "evaluation",
            Stage::Summary => "summary",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 大纲生成失败，整个运行中止
    #[error("Outline generation failed: {0}")]
    OutlineGeneration(LlmError),

    /// 大纲以下的单次生成失败（起草、扩写、评估、摘要）
    #[error("Generation failed at {stage} for chapter {chapter:?}: {source}")]
    SectionGeneration {
        stage: Stage,
        chapter: Option<ChapterNumber>,
        #[source]
        source: LlmError,
    },

    /// 运行被取消
    #[error("Run cancelled")]
    Cancelled,

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 存储错误
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// 导出错误
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl ApplicationError {
    /// 包装大纲以下阶段的生成错误；取消单独区分
    pub fn generation(stage: Stage, chapter: Option<ChapterNumber>, source: LlmError) -> Self {
        match source {
            LlmError::Cancelled => Self::Cancelled,
            source => Self::SectionGeneration {
                stage,
                chapter,
                source,
            },
        }
    }

    /// 包装大纲生成错误
    pub fn outline(source: LlmError) -> Self {
        match source {
            LlmError::Cancelled => Self::Cancelled,
            source => Self::OutlineGeneration(source),
        }
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
