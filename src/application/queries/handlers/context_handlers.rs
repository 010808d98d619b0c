//! Context Query Handlers

use crate::application::ports::NovelStorePort;
use crate::application::queries::{AssembleChapterContext, ChapterContext};
use crate::domain::novel::Character;

/// 每个角色最多带入的目标数
const MAX_GOALS_PER_CHARACTER: usize = 2;

/// 角色精简信息：名称、性格和前两个目标
fn character_capsule(character: &Character) -> String {
    let goals: Vec<&str> = character
        .goals
        .iter()
        .take(MAX_GOALS_PER_CHARACTER)
        .map(String::as_str)
        .collect();
    format!(
        "角色名：{}\n性格：{}\n目标：{}\n",
        character.name,
        character.personality,
        goals.join(", ")
    )
}

/// AssembleChapterContext Handler
///
/// 只读取存储：本章涉及的角色 + 前一章摘要，不含更早章节的任何内容
#[derive(Debug, Default, Clone, Copy)]
pub struct AssembleChapterContextHandler;

impl AssembleChapterContextHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, store: &dyn NovelStorePort, query: &AssembleChapterContext) -> ChapterContext {
        let mut text = String::new();

        let relevant = store.relevant_characters(&query.chapter.characters_involved);
        let characters: Vec<String> = relevant.iter().map(|c| c.name.clone()).collect();
        if !relevant.is_empty() {
            let capsules: Vec<String> = relevant.into_iter().map(character_capsule).collect();
            text.push_str("相关角色信息：\n");
            text.push_str(&capsules.join("\n"));
            text.push_str("\n\n");
        }

        let previous_chapter = query
            .number
            .previous()
            .and_then(|prev| store.chapter_summary(prev).map(|s| (prev, s)))
            .map(|(prev, summary)| {
                text.push_str(&format!(
                    "前一章（{}）摘要：\n{}\n前一章结尾：\n{}\n\n",
                    summary.title, summary.summary, summary.ending
                ));
                prev
            });

        tracing::debug!(
            chapter = %query.number,
            characters = characters.len(),
            previous = ?previous_chapter.map(|n| n.get()),
            context_chars = text.chars().count(),
            "Chapter context assembled"
        );

        ChapterContext {
            text,
            characters,
            previous_chapter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::novel::{ChapterContent, ChapterNumber, ChapterOutline, ChapterSummary};
    use crate::infrastructure::memory::InMemoryNovelStore;

    fn character(name: &str, goals: &[&str]) -> Character {
        Character {
            name: name.to_string(),
            background: format!("{}的漫长背景故事", name),
            personality: format!("{}的性格", name),
            goals: goals.iter().map(|g| g.to_string()).collect(),
            conflicts: vec!["内心挣扎".to_string()],
            arc: "从逃避到面对".to_string(),
        }
    }

    fn chapter_outline(involved: &[&str]) -> ChapterOutline {
        ChapterOutline {
            title: "章节".to_string(),
            summary: "摘要".to_string(),
            key_events: vec![],
            characters_involved: involved.iter().map(|n| n.to_string()).collect(),
            setting: "山城".to_string(),
        }
    }

    fn store_with_chapters(count: u32) -> InMemoryNovelStore {
        let mut store = InMemoryNovelStore::new();
        store
            .set_characters(vec![
                character("林远", &["查明真相", "保护妹妹", "离开山城"]),
                character("苏晴", &["升职"]),
                character("老周", &[]),
            ])
            .unwrap();
        for n in 1..=count {
            let number = ChapterNumber::new(n).unwrap();
            store.set_chapter(number, ChapterContent::new(format!("第{}章", n), format!("正文{}", n)));
            store
                .set_chapter_summary(
                    number,
                    ChapterSummary {
                        title: format!("标题{}", n),
                        summary: format!("摘要{}", n),
                        ending: format!("结尾{}", n),
                    },
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_first_chapter_has_no_previous_block() {
        let store = store_with_chapters(0);
        let query = AssembleChapterContext {
            number: ChapterNumber::first(),
            chapter: chapter_outline(&["林远"]),
        };

        let context = AssembleChapterContextHandler::new().handle(&store, &query);
        assert!(context.previous_chapter.is_none());
        assert!(!context.text.contains("前一章"));
        assert!(context.text.contains("角色名：林远"));
    }

    #[test]
    fn test_only_involved_characters_with_two_goals() {
        let store = store_with_chapters(0);
        let query = AssembleChapterContext {
            number: ChapterNumber::first(),
            chapter: chapter_outline(&["林远", "老周"]),
        };

        let context = AssembleChapterContextHandler::new().handle(&store, &query);
        assert_eq!(context.characters, vec!["林远", "老周"]);
        assert!(!context.text.contains("苏晴"));
        assert!(context.text.contains("目标：查明真相, 保护妹妹\n"));
        assert!(!context.text.contains("离开山城"));
        // 背景、冲突、弧线不进入上下文
        assert!(!context.text.contains("漫长背景故事"));
        assert!(!context.text.contains("内心挣扎"));
    }

    #[test]
    fn test_includes_only_immediately_previous_summary() {
        let store = store_with_chapters(3);
        let query = AssembleChapterContext {
            number: ChapterNumber::new(4).unwrap(),
            chapter: chapter_outline(&[]),
        };

        let context = AssembleChapterContextHandler::new().handle(&store, &query);
        assert_eq!(context.previous_chapter, ChapterNumber::new(3).ok());
        assert!(context.text.contains("前一章（标题3）摘要：\n摘要3"));
        assert!(context.text.contains("结尾3"));
        for older in ["摘要1", "摘要2", "结尾1", "结尾2", "正文"] {
            assert!(!context.text.contains(older), "context leaked {older}");
        }
    }

    #[test]
    fn test_missing_previous_summary_is_omitted() {
        let store = store_with_chapters(1);
        let query = AssembleChapterContext {
            number: ChapterNumber::new(3).unwrap(),
            chapter: chapter_outline(&["无名"]),
        };

        let context = AssembleChapterContextHandler::new().handle(&store, &query);
        assert!(context.is_empty());
        assert!(context.previous_chapter.is_none());
    }
}
