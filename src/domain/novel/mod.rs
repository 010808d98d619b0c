//! Novel Context - 小说生成限界上下文
//!
//! 职责:
//! - 大纲、角色、章节、摘要等生成产物
//! - 质量评估与章节接受规则

mod entities;
mod errors;
mod quality;
mod value_objects;

pub use entities::{
    ChapterContent, ChapterOutline, ChapterSection, ChapterSummary, Character, CharacterRoster,
    NovelOutline,
};
pub use errors::NovelError;
pub use quality::{
    ChapterOutcome, ChapterReport, QualityEvaluation, Shortfall, Verdict, MAX_SCORE, MIN_SCORE,
};
pub use value_objects::{ChapterNumber, SectionKind};
