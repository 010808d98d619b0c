//! Draft Chapter Command Handler
//!
//! 一章分三段依次生成，后一段只看到前一段的片段；
//! 合并后字数不足时做一次整章扩写

use std::sync::Arc;

use crate::application::commands::DraftChapter;
use crate::application::error::{ApplicationError, Stage};
use crate::application::generation::StructuredGenerator;
use crate::application::policy::WritingPolicy;
use crate::application::ports::{AgentKind, ChatMessage};
use crate::application::prompts;
use crate::domain::novel::{ChapterContent, ChapterNumber, ChapterSection, SectionKind};
use crate::domain::{head_chars, tail_chars, word_count};

/// 分段之间的连接符
const SECTION_SEPARATOR: &str = "\n\n";

/// DraftChapter Handler
pub struct DraftChapterHandler {
    generator: Arc<StructuredGenerator>,
    policy: WritingPolicy,
}

impl DraftChapterHandler {
    pub fn new(generator: Arc<StructuredGenerator>, policy: WritingPolicy) -> Self {
        Self { generator, policy }
    }

    pub async fn handle(&self, command: DraftChapter) -> Result<ChapterContent, ApplicationError> {
        let number = command.number;
        let notes = command.revision_notes.as_deref();
        let brief = prompts::chapter_brief(number, &command.chapter);

        let opening_prompt = prompts::opening_prompt(
            &command.context,
            &brief,
            self.policy.target_words(SectionKind::Opening),
            notes,
        );
        let opening = self.section(number, SectionKind::Opening, opening_prompt).await?;

        let middle_prompt = prompts::middle_prompt(
            &brief,
            tail_chars(&opening, self.policy.excerpt_chars),
            self.policy.target_words(SectionKind::Middle),
            notes,
        );
        let middle = self.section(number, SectionKind::Middle, middle_prompt).await?;

        let ending_prompt = prompts::ending_prompt(
            &brief,
            head_chars(&opening, self.policy.opening_lead_chars),
            tail_chars(&middle, self.policy.excerpt_chars),
            self.policy.target_words(SectionKind::Ending),
            notes,
        );
        let ending = self.section(number, SectionKind::Ending, ending_prompt).await?;

        let content = [opening, middle, ending].join(SECTION_SEPARATOR);
        let words = word_count(&content);
        tracing::info!(chapter = %number, words, "Chapter sections merged");

        if words >= self.policy.min_chapter_words {
            return Ok(ChapterContent::new(command.chapter.title, content));
        }

        tracing::info!(
            chapter = %number,
            words,
            min_words = self.policy.min_chapter_words,
            "Chapter below minimum length, expanding"
        );
        let expansion_prompt = prompts::expansion_prompt(
            &brief,
            words,
            head_chars(&content, self.policy.excerpt_chars),
            tail_chars(&content, self.policy.excerpt_chars),
            self.policy.min_chapter_words,
            notes,
        );
        let messages = vec![
            ChatMessage::system(prompts::CHAPTER_WRITER_INSTRUCTIONS),
            ChatMessage::user(expansion_prompt),
        ];
        let expanded: ChapterContent = self
            .generator
            .generate(AgentKind::ChapterWriter, messages)
            .await
            .map_err(|e| ApplicationError::generation(Stage::Expansion, Some(number), e))?;

        tracing::info!(
            chapter = %number,
            before = words,
            after = expanded.word_count(),
            "Chapter expanded"
        );
        // 标题始终沿用大纲
        Ok(ChapterContent {
            title: command.chapter.title,
            content: expanded.content,
            notes: expanded.notes,
        })
    }

    async fn section(
        &self,
        number: ChapterNumber,
        kind: SectionKind,
        prompt: String,
    ) -> Result<String, ApplicationError> {
        let messages = vec![
            ChatMessage::system(prompts::SECTION_WRITER_INSTRUCTIONS),
            ChatMessage::user(prompt),
        ];
        let section: ChapterSection = self
            .generator
            .generate(AgentKind::SectionWriter, messages)
            .await
            .map_err(|e| ApplicationError::generation(Stage::Section, Some(number), e))?;

        if section.section_type != kind {
            tracing::warn!(
                chapter = %number,
                expected = kind.as_str(),
                actual = section.section_type.as_str(),
                "Section type mismatch, using content as requested section"
            );
        }
        tracing::debug!(
            chapter = %number,
            section = kind.as_str(),
            words = word_count(&section.content),
            "Section generated"
        );
        Ok(section.content)
    }
}
