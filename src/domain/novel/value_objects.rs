//! Novel Context - Value Objects

use serde::{Deserialize, Serialize};

/// 章节编号（从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChapterNumber(u32);

impl ChapterNumber {
    pub fn new(number: u32) -> Result<Self, &'static str> {
        if number == 0 {
            return Err("章节编号必须从 1 开始");
        }
        Ok(Self(number))
    }

    pub fn first() -> Self {
        Self(1)
    }

    /// 由大纲中的下标（从 0 开始）得到章节编号
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// 前一章，第一章没有前一章
    pub fn previous(&self) -> Option<Self> {
        if self.0 > 1 {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }
}

impl std::fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 章节分段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// 开头：引入场景和人物
    Opening,
    /// 中间：推进冲突
    Middle,
    /// 结尾：解决冲突或留下钩子
    Ending,
}

impl SectionKind {
    /// 固定的写作顺序
    pub const ORDER: [SectionKind; 3] = [SectionKind::Opening, SectionKind::Middle, SectionKind::Ending];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Opening => "opening",
            SectionKind::Middle => "middle",
            SectionKind::Ending => "ending",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Opening => "开头",
            SectionKind::Middle => "中间",
            SectionKind::Ending => "结尾",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
