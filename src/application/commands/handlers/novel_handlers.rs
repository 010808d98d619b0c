//! Create Novel Command Handler - 整次运行的编排
//!
//! 大纲 -> 角色 -> 按顺序逐章写作 -> 导出

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::{DevelopCharactersHandler, ExportNovelHandler, GenerateOutlineHandler, WriteChapterHandler};
use crate::application::commands::{
    CreateNovel, DevelopCharacters, ExportNovel, GenerateOutline, WriteChapter,
};
use crate::application::error::ApplicationError;
use crate::application::generation::StructuredGenerator;
use crate::application::policy::WritingPolicy;
use crate::application::ports::{NovelExporterPort, NovelStorePort, PipelineEventSink};
use crate::domain::novel::{ChapterNumber, ChapterOutcome, ChapterReport};

/// 运行 ID 前缀
const RUN_ID_PREFIX: &str = "novel_project_";

fn new_run_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}{}", RUN_ID_PREFIX, &id[..8])
}

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct NovelReport {
    pub run_id: String,
    pub title: String,
    pub chapters: Vec<ChapterReport>,
    pub export_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl NovelReport {
    pub fn total_words(&self) -> usize {
        self.chapters.iter().map(|c| c.word_count).sum()
    }

    pub fn count(&self, outcome: ChapterOutcome) -> usize {
        self.chapters.iter().filter(|c| c.outcome == outcome).count()
    }

    pub fn elapsed_secs(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// CreateNovel Handler
pub struct CreateNovelHandler {
    outline: GenerateOutlineHandler,
    characters: DevelopCharactersHandler,
    chapter: WriteChapterHandler,
    export: ExportNovelHandler,
}

impl CreateNovelHandler {
    pub fn new(
        generator: Arc<StructuredGenerator>,
        policy: WritingPolicy,
        exporter: Arc<dyn NovelExporterPort>,
        events: Arc<dyn PipelineEventSink>,
    ) -> Self {
        Self {
            outline: GenerateOutlineHandler::new(generator.clone(), events.clone()),
            characters: DevelopCharactersHandler::new(generator.clone(), events.clone()),
            chapter: WriteChapterHandler::new(generator, policy, events.clone()),
            export: ExportNovelHandler::new(exporter, events),
        }
    }

    pub async fn handle(
        &self,
        store: &mut dyn NovelStorePort,
        command: CreateNovel,
    ) -> Result<NovelReport, ApplicationError> {
        let run_id = new_run_id();
        let span = tracing::info_span!("novel_run", run_id = %run_id);
        self.run(store, command, run_id).instrument(span).await
    }

    /// 导出当前已接受的章节，用于中断后的保存
    pub async fn export_partial(
        &self,
        store: &dyn NovelStorePort,
        file_name: Option<String>,
    ) -> Result<PathBuf, ApplicationError> {
        self.export.handle(store, ExportNovel { file_name }).await
    }

    async fn run(
        &self,
        store: &mut dyn NovelStorePort,
        command: CreateNovel,
        run_id: String,
    ) -> Result<NovelReport, ApplicationError> {
        let started_at = Utc::now();
        tracing::info!(premise_chars = command.premise.chars().count(), "Novel run started");

        let outline = self
            .outline
            .handle(
                store,
                GenerateOutline {
                    premise: command.premise,
                },
            )
            .await?;

        self.characters.handle(store, DevelopCharacters).await?;

        let total = outline.chapter_count();
        let mut chapters = Vec::with_capacity(total);
        for (index, chapter) in outline.chapters.into_iter().enumerate() {
            let number = ChapterNumber::from_index(index);
            tracing::info!(chapter = %number, total, title = %chapter.title, "Writing chapter");
            let report = self
                .chapter
                .handle(store, WriteChapter { number, chapter })
                .await?;
            chapters.push(report);
        }

        let export_path = self
            .export
            .handle(
                &*store,
                ExportNovel {
                    file_name: command.file_name,
                },
            )
            .await?;

        let report = NovelReport {
            run_id,
            title: outline.title,
            chapters,
            export_path,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            title = %report.title,
            total_words = report.total_words(),
            accepted = report.count(ChapterOutcome::Accepted),
            force_accepted = report.count(ChapterOutcome::ForceAccepted),
            failed = report.count(ChapterOutcome::Failed),
            elapsed_secs = report.elapsed_secs(),
            "Novel run finished"
        );
        Ok(report)
    }
}
