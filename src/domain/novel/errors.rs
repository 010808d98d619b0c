//! Novel Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NovelError {
    #[error("无效的大纲: {0}")]
    InvalidOutline(String),

    #[error("无效的角色档案: {0}")]
    InvalidCharacter(String),

    #[error("无效的章节内容: {0}")]
    InvalidContent(String),

    #[error("无效的质量评估: {0}")]
    InvalidEvaluation(String),
}
