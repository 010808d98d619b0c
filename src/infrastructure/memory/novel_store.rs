//! In-Memory Novel Store Implementation

use std::collections::BTreeMap;

use crate::application::ports::{NovelStorePort, StoreError};
use crate::domain::novel::{
    ChapterContent, ChapterNumber, ChapterReport, ChapterSummary, Character, NovelOutline,
};

/// 内存小说存储
///
/// 一次生成运行对应一个实例，由调用方持有
#[derive(Debug, Default)]
pub struct InMemoryNovelStore {
    outline: Option<NovelOutline>,
    /// `None` 表示角色尚未写入，和"写入了空列表"区分
    characters: Option<Vec<Character>>,
    chapters: BTreeMap<ChapterNumber, ChapterContent>,
    summaries: BTreeMap<ChapterNumber, ChapterSummary>,
    reports: BTreeMap<ChapterNumber, ChapterReport>,
}

impl InMemoryNovelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已保存的摘要数
    pub fn summary_count(&self) -> usize {
        self.summaries.len()
    }
}

impl NovelStorePort for InMemoryNovelStore {
    fn outline(&self) -> Option<&NovelOutline> {
        self.outline.as_ref()
    }

    fn set_outline(&mut self, outline: NovelOutline) -> Result<(), StoreError> {
        if self.outline.is_some() {
            return Err(StoreError::AlreadyInitialized("outline"));
        }
        tracing::info!(title = %outline.title, chapters = outline.chapters.len(), "Outline stored");
        self.outline = Some(outline);
        Ok(())
    }

    fn characters(&self) -> &[Character] {
        self.characters.as_deref().unwrap_or(&[])
    }

    fn set_characters(&mut self, characters: Vec<Character>) -> Result<(), StoreError> {
        if self.characters.is_some() {
            return Err(StoreError::AlreadyInitialized("characters"));
        }
        tracing::info!(count = characters.len(), "Characters stored");
        self.characters = Some(characters);
        Ok(())
    }

    fn chapter(&self, number: ChapterNumber) -> Option<&ChapterContent> {
        self.chapters.get(&number)
    }

    fn set_chapter(&mut self, number: ChapterNumber, chapter: ChapterContent) {
        tracing::debug!(chapter = %number, title = %chapter.title, "Chapter stored");
        self.chapters.insert(number, chapter);
    }

    fn chapter_summary(&self, number: ChapterNumber) -> Option<&ChapterSummary> {
        self.summaries.get(&number)
    }

    fn set_chapter_summary(
        &mut self,
        number: ChapterNumber,
        summary: ChapterSummary,
    ) -> Result<(), StoreError> {
        if !self.chapters.contains_key(&number) {
            return Err(StoreError::ChapterMissing(number));
        }
        tracing::debug!(chapter = %number, "Chapter summary stored");
        self.summaries.insert(number, summary);
        Ok(())
    }

    fn chapter_report(&self, number: ChapterNumber) -> Option<&ChapterReport> {
        self.reports.get(&number)
    }

    fn set_chapter_report(&mut self, report: ChapterReport) {
        self.reports.insert(report.number, report);
    }

    fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(name: &str) -> Character {
        Character {
            name: name.to_string(),
            background: "背景".to_string(),
            personality: "沉稳".to_string(),
            goals: vec!["查明真相".to_string()],
            conflicts: vec![],
            arc: "成长".to_string(),
        }
    }

    fn outline() -> NovelOutline {
        NovelOutline {
            title: "雾中城".to_string(),
            genre: "悬疑".to_string(),
            theme: "记忆".to_string(),
            setting: "山城".to_string(),
            plot_summary: "追查失踪案".to_string(),
            chapters: vec![],
            characters: vec![],
        }
    }

    #[test]
    fn test_outline_is_write_once() {
        let mut store = InMemoryNovelStore::new();
        assert!(store.outline().is_none());
        store.set_outline(outline()).unwrap();
        assert_eq!(
            store.set_outline(outline()),
            Err(StoreError::AlreadyInitialized("outline"))
        );
    }

    #[test]
    fn test_characters_are_write_once_even_when_empty() {
        let mut store = InMemoryNovelStore::new();
        assert!(store.characters().is_empty());
        store.set_characters(vec![]).unwrap();
        assert!(store.set_characters(vec![character("林远")]).is_err());
        assert!(store.characters().is_empty());
    }

    #[test]
    fn test_relevant_characters_filters_by_name() {
        let mut store = InMemoryNovelStore::new();
        store
            .set_characters(vec![character("林远"), character("苏晴"), character("老周")])
            .unwrap();

        let names = vec!["老周".to_string(), "林远".to_string(), "无名".to_string()];
        let relevant: Vec<&str> = store
            .relevant_characters(&names)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(relevant, vec!["林远", "老周"]);
    }

    #[test]
    fn test_summary_requires_stored_chapter() {
        let mut store = InMemoryNovelStore::new();
        let number = ChapterNumber::first();
        let summary = ChapterSummary {
            title: "开端".to_string(),
            summary: "概要".to_string(),
            ending: "结尾".to_string(),
        };

        assert_eq!(
            store.set_chapter_summary(number, summary.clone()),
            Err(StoreError::ChapterMissing(number))
        );

        store.set_chapter(number, ChapterContent::new("开端", "正文"));
        store.set_chapter_summary(number, summary).unwrap();
        assert!(store.chapter_summary(number).is_some());
        assert_eq!(store.summary_count(), 1);
    }

    #[test]
    fn test_missing_reads_are_absent() {
        let store = InMemoryNovelStore::new();
        let number = ChapterNumber::new(7).unwrap();
        assert!(store.chapter(number).is_none());
        assert!(store.chapter_summary(number).is_none());
        assert!(store.chapter_report(number).is_none());
        assert_eq!(store.chapter_count(), 0);
    }
}
