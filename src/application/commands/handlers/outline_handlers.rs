//! Outline & Character Command Handlers

use std::sync::Arc;

use crate::application::commands::{DevelopCharacters, GenerateOutline};
use crate::application::error::{ApplicationError, Stage};
use crate::application::generation::StructuredGenerator;
use crate::application::ports::{
    AgentKind, ChatMessage, NovelStorePort, PipelineEvent, PipelineEventSink,
};
use crate::application::prompts;
use crate::domain::novel::{Character, CharacterRoster, NovelOutline};

// ============================================================================
// GenerateOutline
// ============================================================================

/// GenerateOutline Handler - 生成并保存大纲，失败时整个运行中止
pub struct GenerateOutlineHandler {
    generator: Arc<StructuredGenerator>,
    events: Arc<dyn PipelineEventSink>,
}

impl GenerateOutlineHandler {
    pub fn new(generator: Arc<StructuredGenerator>, events: Arc<dyn PipelineEventSink>) -> Self {
        Self { generator, events }
    }

    pub async fn handle(
        &self,
        store: &mut dyn NovelStorePort,
        command: GenerateOutline,
    ) -> Result<NovelOutline, ApplicationError> {
        if store.outline().is_some() {
            return Err(ApplicationError::invalid_state("outline already generated"));
        }

        let messages = vec![
            ChatMessage::system(prompts::OUTLINE_INSTRUCTIONS),
            ChatMessage::user(command.premise),
        ];

        let outline: NovelOutline = self
            .generator
            .generate(AgentKind::Outline, messages)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Outline generation failed");
                ApplicationError::outline(e)
            })?;

        store.set_outline(outline.clone())?;

        tracing::info!(
            title = %outline.title,
            genre = %outline.genre,
            chapters = outline.chapter_count(),
            "Novel outline created"
        );
        self.events.publish(PipelineEvent::OutlineReady {
            title: outline.title.clone(),
            chapter_count: outline.chapter_count(),
        });

        Ok(outline)
    }
}

// ============================================================================
// DevelopCharacters
// ============================================================================

/// DevelopCharacters Handler - 生成角色档案
///
/// 生成失败时保存空角色表并继续，后续章节只是缺少角色上下文
pub struct DevelopCharactersHandler {
    generator: Arc<StructuredGenerator>,
    events: Arc<dyn PipelineEventSink>,
}

impl DevelopCharactersHandler {
    pub fn new(generator: Arc<StructuredGenerator>, events: Arc<dyn PipelineEventSink>) -> Self {
        Self { generator, events }
    }

    pub async fn handle(
        &self,
        store: &mut dyn NovelStorePort,
        _command: DevelopCharacters,
    ) -> Result<Vec<Character>, ApplicationError> {
        let outline = store
            .outline()
            .ok_or_else(|| ApplicationError::invalid_state("characters require an outline"))?;

        let messages = vec![
            ChatMessage::system(prompts::CHARACTER_INSTRUCTIONS),
            ChatMessage::user(prompts::character_prompt(outline)),
        ];

        let characters = match self
            .generator
            .generate::<CharacterRoster>(AgentKind::Character, messages)
            .await
        {
            Ok(roster) => roster.characters,
            Err(e) => match ApplicationError::generation(Stage::Characters, None, e) {
                ApplicationError::Cancelled => return Err(ApplicationError::Cancelled),
                err => {
                    tracing::warn!(error = %err, "Character development failed, continuing without profiles");
                    Vec::new()
                }
            },
        };

        store.set_characters(characters.clone())?;

        let names: Vec<String> = characters.iter().map(|c| c.name.clone()).collect();
        tracing::info!(characters = %names.join(", "), "Character profiles created");
        self.events.publish(PipelineEvent::CharactersReady { names });

        Ok(characters)
    }
}
