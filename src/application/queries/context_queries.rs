//! Context Queries

use crate::domain::novel::{ChapterNumber, ChapterOutline};

/// 组装章节写作上下文
#[derive(Debug, Clone)]
pub struct AssembleChapterContext {
    pub number: ChapterNumber,
    pub chapter: ChapterOutline,
}

/// 章节写作上下文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterContext {
    /// 拼接好的上下文文本
    pub text: String,
    /// 包含的角色
    pub characters: Vec<String>,
    /// 引用了哪一章的摘要
    pub previous_chapter: Option<ChapterNumber>,
}

impl ChapterContext {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
