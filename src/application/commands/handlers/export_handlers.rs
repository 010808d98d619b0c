//! Export Novel Command Handler

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::commands::ExportNovel;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ExportError, NovelExporterPort, NovelStorePort, PipelineEvent, PipelineEventSink,
};
use crate::domain::novel::{ChapterNumber, ChapterOutcome, Character};
use crate::domain::sanitize_file_stem;

/// 强制接受章节的标注
const FORCE_ACCEPTED_MARK: &str = "[未通过质量评估，已强制接受]";

fn render_character(character: &Character) -> String {
    format!(
        "### {}\n背景: {}\n性格: {}\n目标: {}\n冲突: {}\n成长弧线: {}\n\n",
        character.name,
        character.background,
        character.personality,
        character.goals.join(", "),
        character.conflicts.join(", "),
        character.arc,
    )
}

/// 把存储中的产物渲染为成稿文本
///
/// 按大纲章节顺序输出，缺失的章节跳过
pub fn render_manuscript(store: &dyn NovelStorePort) -> Result<String, ApplicationError> {
    let outline = store
        .outline()
        .ok_or_else(|| ExportError::NothingToExport("no outline".to_string()))?;

    let mut text = format!(
        "# {}\n\n类型: {}\n主题: {}\n\n## 情节概要\n\n{}\n\n",
        outline.title, outline.genre, outline.theme, outline.plot_summary
    );

    text.push_str("## 角色\n\n");
    for character in store.characters() {
        text.push_str(&render_character(character));
    }

    text.push_str("## 小说内容\n\n");
    for number in (0..outline.chapter_count()).map(ChapterNumber::from_index) {
        let Some(chapter) = store.chapter(number) else {
            continue;
        };
        text.push_str(&format!("\n\n### 第{}章: {}\n\n", number, chapter.title));
        text.push_str(&chapter.content);
        text.push_str(&format!("\n\n[字数：{}]\n\n", chapter.word_count()));

        let forced = store
            .chapter_report(number)
            .is_some_and(|r| r.outcome == ChapterOutcome::ForceAccepted);
        if forced {
            text.push_str(FORCE_ACCEPTED_MARK);
            text.push_str("\n\n");
        }
    }

    Ok(text)
}

/// ExportNovel Handler
pub struct ExportNovelHandler {
    exporter: Arc<dyn NovelExporterPort>,
    events: Arc<dyn PipelineEventSink>,
}

impl ExportNovelHandler {
    pub fn new(exporter: Arc<dyn NovelExporterPort>, events: Arc<dyn PipelineEventSink>) -> Self {
        Self { exporter, events }
    }

    pub async fn handle(
        &self,
        store: &dyn NovelStorePort,
        command: ExportNovel,
    ) -> Result<PathBuf, ApplicationError> {
        let manuscript = render_manuscript(store)?;

        let file_name = match command.file_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                let title = store.outline().map(|o| o.title.as_str()).unwrap_or_default();
                format!("{}.txt", sanitize_file_stem(title))
            }
        };

        let path = self.exporter.export(&file_name, &manuscript).await?;
        tracing::info!(
            path = %path.display(),
            chapters = store.chapter_count(),
            "Novel exported"
        );
        self.events
            .publish(PipelineEvent::NovelExported { path: path.clone() });

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::fixtures;
    use crate::domain::novel::{ChapterContent, ChapterReport};
    use crate::infrastructure::adapters::FileNovelExporter;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryNovelStore;

    fn store_with(chapters: &[u32]) -> InMemoryNovelStore {
        let mut store = InMemoryNovelStore::new();
        store.set_outline(fixtures::outline(3)).unwrap();
        store.set_characters(fixtures::characters()).unwrap();
        for &n in chapters {
            store.set_chapter(
                ChapterNumber::new(n).unwrap(),
                ChapterContent::new(format!("第{}幕", n), format!("正文 {} 结束", n)),
            );
        }
        store
    }

    #[test]
    fn test_manuscript_layout() {
        let store = store_with(&[1, 2]);
        let text = render_manuscript(&store).unwrap();

        assert!(text.starts_with("# 雾中城\n\n类型: 悬疑\n主题: 记忆与真相\n\n## 情节概要\n\n"));
        assert!(text.contains(
            "### 林远\n背景: 离乡多年的侦探\n性格: 冷静而固执\n目标: 查明旧案, 与父亲和解, 离开山城\n冲突: 对故乡的抗拒\n成长弧线: 从逃避到面对\n\n"
        ));
        assert!(text.contains("## 小说内容\n\n\n\n### 第1章: 第1幕\n\n正文 1 结束\n\n[字数：3]\n\n"));

        let first = text.find("### 第1章").unwrap();
        let second = text.find("### 第2章").unwrap();
        assert!(first < second);
        assert!(!text.contains("第3章"));
        assert!(!text.contains(FORCE_ACCEPTED_MARK));
    }

    #[test]
    fn test_force_accepted_chapter_is_marked() {
        let mut store = store_with(&[1]);
        store.set_chapter_report(ChapterReport {
            number: ChapterNumber::first(),
            title: "第1幕".to_string(),
            outcome: ChapterOutcome::ForceAccepted,
            attempts: 3,
            word_count: 3,
            last_score: Some(6),
            last_feedback: None,
        });

        let text = render_manuscript(&store).unwrap();
        assert!(text.contains("[字数：3]\n\n[未通过质量评估，已强制接受]"));
    }

    #[test]
    fn test_nothing_to_export_without_outline() {
        let store = InMemoryNovelStore::new();
        assert!(matches!(
            render_manuscript(&store),
            Err(ApplicationError::Export(ExportError::NothingToExport(_)))
        ));
    }

    #[tokio::test]
    async fn test_export_uses_sanitized_title() {
        let dir = tempfile::tempdir().unwrap();
        let handler = ExportNovelHandler::new(
            Arc::new(FileNovelExporter::new(dir.path())),
            EventPublisher::new().arc(),
        );
        let store = store_with(&[1]);

        let path = handler.handle(&store, ExportNovel::default()).await.unwrap();
        assert_eq!(path, dir.path().join("雾中城.txt"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("### 第1章: 第1幕"));
    }

    #[tokio::test]
    async fn test_export_uses_explicit_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let events = EventPublisher::new().arc();
        let mut rx = events.subscribe();
        let handler = ExportNovelHandler::new(Arc::new(FileNovelExporter::new(dir.path())), events);
        let store = store_with(&[]);

        let path = handler
            .handle(
                &store,
                ExportNovel {
                    file_name: Some("draft.txt".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("draft.txt"));
        assert_eq!(rx.try_recv().unwrap(), PipelineEvent::NovelExported { path });
    }
}
