//! Domain Layer - 领域层
//!
//! 包含一个限界上下文:
//! - Novel Context: 大纲、角色、章节与质量评估

pub mod novel;

// 共享的文本度量工具
mod text_metrics;

pub use text_metrics::{head_chars, sanitize_file_stem, tail_chars, word_count};
