//! File Exporter - 文件系统成稿导出实现
//!
//! 实现 NovelExporterPort trait

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ExportError, NovelExporterPort};

/// 文件系统成稿导出
pub struct FileNovelExporter {
    /// 输出目录
    output_dir: PathBuf,
}

impl FileNovelExporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// 文件名只能是单个普通路径分量
    fn target_path(&self, file_name: &str) -> Result<PathBuf, ExportError> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.output_dir.join(file_name)),
            _ => Err(ExportError::InvalidFileName(file_name.to_string())),
        }
    }
}

#[async_trait]
impl NovelExporterPort for FileNovelExporter {
    async fn export(&self, file_name: &str, manuscript: &str) -> Result<PathBuf, ExportError> {
        let path = self.target_path(file_name)?;

        // 确保输出目录存在
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ExportError::IoError(e.to_string()))?;

        fs::write(&path, manuscript)
            .await
            .map_err(|e| ExportError::IoError(e.to_string()))?;

        tracing::info!(
            path = %path.display(),
            size = manuscript.len(),
            "Manuscript exported"
        );

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_export_writes_file() {
        let temp_dir = tempdir().unwrap();
        let exporter = FileNovelExporter::new(temp_dir.path().join("out"));

        let path = exporter.export("雾中城.txt", "# 雾中城\n").await.unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# 雾中城\n");
    }

    #[tokio::test]
    async fn test_export_rejects_path_traversal() {
        let temp_dir = tempdir().unwrap();
        let exporter = FileNovelExporter::new(temp_dir.path());

        for name in ["../escape.txt", "a/b.txt", "", "/abs.txt"] {
            let result = exporter.export(name, "x").await;
            assert!(
                matches!(result, Err(ExportError::InvalidFileName(_))),
                "{name} should be rejected"
            );
        }
    }
}
