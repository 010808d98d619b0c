//! Storage Adapter - 成稿文件导出

mod file_exporter;

pub use file_exporter::FileNovelExporter;
