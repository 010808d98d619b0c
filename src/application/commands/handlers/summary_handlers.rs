//! Summarize Chapter Command Handler

use std::sync::Arc;

use crate::application::commands::SummarizeChapter;
use crate::application::error::{ApplicationError, Stage};
use crate::application::generation::StructuredGenerator;
use crate::application::policy::WritingPolicy;
use crate::application::ports::{AgentKind, ChatMessage, NovelStorePort};
use crate::application::prompts;
use crate::domain::novel::{ChapterContent, ChapterSummary};
use crate::domain::{head_chars, tail_chars};

/// 兜底摘要取正文开头的字符数
const FALLBACK_SUMMARY_CHARS: usize = 300;

/// SummarizeChapter Handler
///
/// 章节必须已写入存储；摘要只根据本章正文生成
pub struct SummarizeChapterHandler {
    generator: Arc<StructuredGenerator>,
    policy: WritingPolicy,
}

impl SummarizeChapterHandler {
    pub fn new(generator: Arc<StructuredGenerator>, policy: WritingPolicy) -> Self {
        Self { generator, policy }
    }

    pub async fn handle(
        &self,
        store: &mut dyn NovelStorePort,
        command: SummarizeChapter,
    ) -> Result<ChapterSummary, ApplicationError> {
        let number = command.number;
        let chapter = &command.chapter;

        let head = head_chars(&chapter.content, self.policy.summary_input_chars);
        let truncated = head.len() < chapter.content.len();
        let ending = tail_chars(&chapter.content, self.policy.excerpt_chars);

        let messages = vec![
            ChatMessage::system(prompts::SUMMARY_INSTRUCTIONS),
            ChatMessage::user(prompts::summary_prompt(&chapter.title, head, truncated, ending)),
        ];

        let summary = match self
            .generator
            .generate::<ChapterSummary>(AgentKind::Summary, messages)
            .await
        {
            Ok(summary) => summary,
            Err(e) => match ApplicationError::generation(Stage::Summary, Some(number), e) {
                ApplicationError::Cancelled => return Err(ApplicationError::Cancelled),
                err => {
                    tracing::warn!(chapter = %number, error = %err, "Summary generation failed, using extract");
                    self.fallback(chapter)
                }
            },
        };

        store.set_chapter_summary(number, summary.clone())?;
        tracing::info!(
            chapter = %number,
            summary_chars = summary.summary.chars().count(),
            "Chapter summary stored"
        );

        Ok(summary)
    }

    /// 摘取式兜底摘要，保证下一章仍有前情
    fn fallback(&self, chapter: &ChapterContent) -> ChapterSummary {
        ChapterSummary {
            title: chapter.title.clone(),
            summary: head_chars(&chapter.content, FALLBACK_SUMMARY_CHARS).to_string(),
            ending: tail_chars(&chapter.content, self.policy.excerpt_chars).to_string(),
        }
    }
}
