//! Pipeline Event Port - 进度事件
//!
//! 应用层通过该端口发布进度，具体实现在 infrastructure/events 层

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 生成流水线事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum PipelineEvent {
    /// 大纲已生成
    OutlineReady { title: String, chapter_count: usize },
    /// 角色档案已生成
    CharactersReady { names: Vec<String> },
    /// 开始一轮起草
    ChapterAttempt { chapter: u32, attempt: u32 },
    /// 本轮未通过
    ChapterRejected {
        chapter: u32,
        attempt: u32,
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<u8>,
    },
    /// 章节通过
    ChapterAccepted {
        chapter: u32,
        attempts: u32,
        word_count: usize,
        score: u8,
    },
    /// 达到迭代上限后强制接受
    ChapterForceAccepted {
        chapter: u32,
        attempts: u32,
        word_count: usize,
    },
    /// 所有尝试都失败
    ChapterFailed { chapter: u32, error: String },
    /// 成稿已导出
    NovelExported { path: PathBuf },
}

/// Pipeline Event Sink Port
pub trait PipelineEventSink: Send + Sync {
    /// 发布事件，没有订阅者时静默丢弃
    fn publish(&self, event: PipelineEvent);
}
