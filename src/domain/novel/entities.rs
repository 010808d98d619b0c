//! Novel Context - Entities
//!
//! 大纲、角色、章节等生成产物。字段名与模型输出的 JSON 结构一一对应。

use serde::{Deserialize, Serialize};

use super::{NovelError, SectionKind};

/// 小说大纲
///
/// 不变量:
/// - 至少包含一个章节
/// - 创建后不可修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelOutline {
    pub title: String,
    pub genre: String,
    pub theme: String,
    pub setting: String,
    pub plot_summary: String,
    pub chapters: Vec<ChapterOutline>,
    /// 角色名称列表，详细档案单独生成
    pub characters: Vec<String>,
}

impl NovelOutline {
    pub fn validate(&self) -> Result<(), NovelError> {
        if self.title.trim().is_empty() {
            return Err(NovelError::InvalidOutline("标题不能为空".to_string()));
        }
        if self.chapters.is_empty() {
            return Err(NovelError::InvalidOutline("大纲没有任何章节".to_string()));
        }
        if let Some(index) = self.chapters.iter().position(|c| c.title.trim().is_empty()) {
            return Err(NovelError::InvalidOutline(format!(
                "第{}章缺少标题",
                index + 1
            )));
        }
        Ok(())
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

/// 章节大纲
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOutline {
    pub title: String,
    pub summary: String,
    pub key_events: Vec<String>,
    pub characters_involved: Vec<String>,
    pub setting: String,
}

impl ChapterOutline {
    pub fn involves(&self, name: &str) -> bool {
        self.characters_involved.iter().any(|n| n == name)
    }
}

/// 角色档案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// 角色名（唯一）
    pub name: String,
    pub background: String,
    pub personality: String,
    pub goals: Vec<String>,
    pub conflicts: Vec<String>,
    /// 成长弧线
    pub arc: String,
}

/// 模型一次返回的全部角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRoster {
    pub characters: Vec<Character>,
}

impl CharacterRoster {
    pub fn validate(&self) -> Result<(), NovelError> {
        let mut seen = std::collections::HashSet::new();
        for character in &self.characters {
            if character.name.trim().is_empty() {
                return Err(NovelError::InvalidCharacter("角色名不能为空".to_string()));
            }
            if !seen.insert(character.name.as_str()) {
                return Err(NovelError::InvalidCharacter(format!(
                    "角色名重复: {}",
                    character.name
                )));
            }
        }
        Ok(())
    }
}

/// 章节正文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContent {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub notes: String,
}

impl ChapterContent {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            notes: String::new(),
        }
    }

    pub fn word_count(&self) -> usize {
        crate::domain::word_count(&self.content)
    }
}

/// 章节的一个部分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSection {
    pub section_type: SectionKind,
    pub content: String,
}

/// 章节摘要，供下一章作为上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub title: String,
    pub summary: String,
    /// 章节结尾片段
    pub ending: String,
}
