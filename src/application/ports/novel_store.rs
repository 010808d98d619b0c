//! Novel Store Port - 生成产物存储
//!
//! 一次运行只有一个写入者，实例由调用方持有并按引用传递，
//! 因此接口全部是同步的，写操作使用 `&mut self`。
//! 读操作总是成功：缺失的键返回 `None` 或空集合。

use thiserror::Error;

use crate::domain::novel::{
    ChapterContent, ChapterNumber, ChapterReport, ChapterSummary, Character, NovelOutline,
};

/// Store 错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// 只允许写入一次的数据被重复写入
    #[error("{0} already initialized")]
    AlreadyInitialized(&'static str),

    /// 章节尚未写入，不能为其保存摘要
    #[error("Chapter {0} has not been accepted")]
    ChapterMissing(ChapterNumber),
}

/// Novel Store Port
pub trait NovelStorePort: Send {
    /// 获取大纲
    fn outline(&self) -> Option<&NovelOutline>;

    /// 保存大纲（只能写入一次）
    fn set_outline(&mut self, outline: NovelOutline) -> Result<(), StoreError>;

    /// 获取全部角色
    fn characters(&self) -> &[Character];

    /// 保存角色列表（只能写入一次）
    fn set_characters(&mut self, characters: Vec<Character>) -> Result<(), StoreError>;

    /// 按名称集合过滤角色，保持角色表原有顺序
    fn relevant_characters(&self, names: &[String]) -> Vec<&Character> {
        self.characters()
            .iter()
            .filter(|c| names.iter().any(|n| n == &c.name))
            .collect()
    }

    /// 获取章节
    fn chapter(&self, number: ChapterNumber) -> Option<&ChapterContent>;

    /// 保存章节
    fn set_chapter(&mut self, number: ChapterNumber, chapter: ChapterContent);

    /// 获取章节摘要
    fn chapter_summary(&self, number: ChapterNumber) -> Option<&ChapterSummary>;

    /// 保存章节摘要，对应章节必须已存在
    fn set_chapter_summary(
        &mut self,
        number: ChapterNumber,
        summary: ChapterSummary,
    ) -> Result<(), StoreError>;

    /// 获取章节报告
    fn chapter_report(&self, number: ChapterNumber) -> Option<&ChapterReport>;

    /// 保存章节报告
    fn set_chapter_report(&mut self, report: ChapterReport);

    /// 已写入的章节数
    fn chapter_count(&self) -> usize;
}
