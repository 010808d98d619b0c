//! Novel Exporter Port - 成稿导出

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: {0}")]
    NothingToExport(String),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Novel Exporter Port
#[async_trait]
pub trait NovelExporterPort: Send + Sync {
    /// 把渲染好的成稿写成单个文本文件，返回最终路径
    async fn export(&self, file_name: &str, manuscript: &str) -> Result<PathBuf, ExportError>;
}
