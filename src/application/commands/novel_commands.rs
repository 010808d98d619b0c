//! Novel Commands

use crate::domain::novel::{ChapterContent, ChapterNumber, ChapterOutline};

/// 完整生成一部小说
#[derive(Debug, Clone)]
pub struct CreateNovel {
    /// 用户对小说的描述（类型、主题、背景等）
    pub premise: String,
    /// 导出文件名，为空时由标题生成
    pub file_name: Option<String>,
}

/// 生成大纲
#[derive(Debug, Clone)]
pub struct GenerateOutline {
    pub premise: String,
}

/// 根据已存储的大纲生成角色档案
#[derive(Debug, Clone, Default)]
pub struct DevelopCharacters;

/// 分段起草一章
#[derive(Debug, Clone)]
pub struct DraftChapter {
    pub number: ChapterNumber,
    pub chapter: ChapterOutline,
    /// 组装好的上下文（角色 + 前一章摘要）
    pub context: String,
    /// 上一轮评估的反馈，只作为提示词内容
    pub revision_notes: Option<String>,
}

/// 写一章：起草、评估、必要时重写
#[derive(Debug, Clone)]
pub struct WriteChapter {
    pub number: ChapterNumber,
    pub chapter: ChapterOutline,
}

/// 为已接受的章节生成摘要
#[derive(Debug, Clone)]
pub struct SummarizeChapter {
    pub number: ChapterNumber,
    pub chapter: ChapterContent,
}

/// 导出成稿
#[derive(Debug, Clone, Default)]
pub struct ExportNovel {
    pub file_name: Option<String>,
}
