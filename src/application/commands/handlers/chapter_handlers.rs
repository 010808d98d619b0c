//! Write Chapter Command Handler - 质量循环
//!
//! 起草 -> 评估 -> 接受 / 重写，最多 `max_iterations` 次起草；
//! 次数用尽时强制接受最后一份草稿

use std::sync::Arc;

use super::{DraftChapterHandler, SummarizeChapterHandler};
use crate::application::commands::{DraftChapter, SummarizeChapter, WriteChapter};
use crate::application::error::{ApplicationError, Stage};
use crate::application::generation::StructuredGenerator;
use crate::application::policy::WritingPolicy;
use crate::application::ports::{
    AgentKind, ChatMessage, NovelStorePort, PipelineEvent, PipelineEventSink,
};
use crate::application::prompts;
use crate::application::queries::handlers::AssembleChapterContextHandler;
use crate::application::queries::AssembleChapterContext;
use crate::domain::novel::{
    ChapterContent, ChapterNumber, ChapterOutcome, ChapterOutline, ChapterReport,
    QualityEvaluation, Verdict,
};

/// WriteChapter Handler
pub struct WriteChapterHandler {
    generator: Arc<StructuredGenerator>,
    policy: WritingPolicy,
    events: Arc<dyn PipelineEventSink>,
    context: AssembleChapterContextHandler,
    drafter: DraftChapterHandler,
    summarizer: SummarizeChapterHandler,
}

impl WriteChapterHandler {
    pub fn new(
        generator: Arc<StructuredGenerator>,
        policy: WritingPolicy,
        events: Arc<dyn PipelineEventSink>,
    ) -> Self {
        Self {
            context: AssembleChapterContextHandler::new(),
            drafter: DraftChapterHandler::new(generator.clone(), policy.clone()),
            summarizer: SummarizeChapterHandler::new(generator.clone(), policy.clone()),
            generator,
            policy,
            events,
        }
    }

    /// 写完一章并返回报告
    ///
    /// 起草或评估失败只消耗一次机会；只有取消会中止整个运行
    pub async fn handle(
        &self,
        store: &mut dyn NovelStorePort,
        command: WriteChapter,
    ) -> Result<ChapterReport, ApplicationError> {
        let number = command.number;
        let chapter = command.chapter;
        let context = self.context.handle(
            &*store,
            &AssembleChapterContext {
                number,
                chapter: chapter.clone(),
            },
        );

        let mut candidate: Option<ChapterContent> = None;
        let mut last_evaluation: Option<QualityEvaluation> = None;
        let mut revision_notes: Option<String> = None;
        let mut last_error: Option<ApplicationError> = None;
        let mut accepted = false;
        let mut attempts = 0;

        while attempts < self.policy.max_iterations {
            attempts += 1;
            tracing::info!(chapter = %number, attempt = attempts, "Drafting chapter");
            self.events.publish(PipelineEvent::ChapterAttempt {
                chapter: number.get(),
                attempt: attempts,
            });

            let draft = match self
                .drafter
                .handle(DraftChapter {
                    number,
                    chapter: chapter.clone(),
                    context: context.text.clone(),
                    revision_notes: revision_notes.clone(),
                })
                .await
            {
                Ok(draft) => draft,
                Err(ApplicationError::Cancelled) => return Err(ApplicationError::Cancelled),
                Err(e) => {
                    tracing::warn!(chapter = %number, attempt = attempts, error = %e, "Draft attempt failed");
                    self.reject(number, attempts, e.to_string(), None);
                    last_error = Some(e);
                    continue;
                }
            };

            // 新草稿整体替换旧草稿，旧草稿的评估随之作废
            last_evaluation = None;
            let draft = &*candidate.insert(draft);

            match self.evaluate(number, &chapter, draft).await {
                Ok(evaluation) => {
                    let verdict = evaluation.verdict(self.policy.pass_score);
                    let score = evaluation.score;
                    match verdict {
                        Verdict::Accept => {
                            last_evaluation = Some(evaluation);
                            accepted = true;
                            break;
                        }
                        Verdict::Revise(shortfall) => {
                            tracing::warn!(
                                chapter = %number,
                                attempt = attempts,
                                score,
                                passes = evaluation.passes,
                                length_check = evaluation.length_check,
                                reason = shortfall.as_str(),
                                "Chapter rejected"
                            );
                            self.reject(number, attempts, shortfall.as_str().to_string(), Some(score));
                            revision_notes = Some(evaluation.feedback.clone());
                            last_evaluation = Some(evaluation);
                        }
                    }
                }
                Err(ApplicationError::Cancelled) => return Err(ApplicationError::Cancelled),
                Err(e) => {
                    tracing::warn!(chapter = %number, attempt = attempts, error = %e, "Evaluation failed");
                    self.reject(number, attempts, e.to_string(), None);
                    last_error = Some(e);
                }
            }
        }

        let Some(mut content) = candidate else {
            let error = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no draft produced".to_string());
            tracing::error!(chapter = %number, attempts, error = %error, "Chapter failed, nothing stored");
            self.events.publish(PipelineEvent::ChapterFailed {
                chapter: number.get(),
                error,
            });
            let report = ChapterReport {
                number,
                title: chapter.title,
                outcome: ChapterOutcome::Failed,
                attempts,
                word_count: 0,
                last_score: last_evaluation.as_ref().map(|e| e.score),
                last_feedback: last_evaluation.map(|e| e.feedback),
            };
            store.set_chapter_report(report.clone());
            return Ok(report);
        };

        let word_count = content.word_count();
        let outcome = if accepted {
            let score = last_evaluation.as_ref().map(|e| e.score).unwrap_or_default();
            tracing::info!(
                chapter = %number,
                attempts,
                score,
                words = word_count,
                outcome = ChapterOutcome::Accepted.as_str(),
                "Chapter accepted"
            );
            self.events.publish(PipelineEvent::ChapterAccepted {
                chapter: number.get(),
                attempts,
                word_count,
                score,
            });
            ChapterOutcome::Accepted
        } else {
            tracing::warn!(
                chapter = %number,
                attempts,
                words = word_count,
                last_score = ?last_evaluation.as_ref().map(|e| e.score),
                outcome = ChapterOutcome::ForceAccepted.as_str(),
                "Iteration limit reached, force accepting last draft"
            );
            self.events.publish(PipelineEvent::ChapterForceAccepted {
                chapter: number.get(),
                attempts,
                word_count,
            });
            ChapterOutcome::ForceAccepted
        };

        if let Some(evaluation) = &last_evaluation {
            content.notes = evaluation.feedback.clone();
        }
        store.set_chapter(number, content.clone());

        // 报告在摘要之前写入
        let report = ChapterReport {
            number,
            title: chapter.title,
            outcome,
            attempts,
            word_count,
            last_score: last_evaluation.as_ref().map(|e| e.score),
            last_feedback: last_evaluation.map(|e| e.feedback),
        };
        store.set_chapter_report(report.clone());

        self.summarizer
            .handle(
                store,
                SummarizeChapter {
                    number,
                    chapter: content,
                },
            )
            .await?;

        Ok(report)
    }

    async fn evaluate(
        &self,
        number: ChapterNumber,
        outline: &ChapterOutline,
        draft: &ChapterContent,
    ) -> Result<QualityEvaluation, ApplicationError> {
        let messages = vec![
            ChatMessage::system(prompts::QUALITY_EVALUATOR_INSTRUCTIONS),
            ChatMessage::user(prompts::evaluation_prompt(
                number,
                outline,
                draft,
                self.policy.min_chapter_words,
            )),
        ];
        let evaluation: QualityEvaluation = self
            .generator
            .generate(AgentKind::QualityEvaluator, messages)
            .await
            .map_err(|e| ApplicationError::generation(Stage::Evaluation, Some(number), e))?;

        tracing::info!(
            chapter = %number,
            score = evaluation.score,
            passes = evaluation.passes,
            length_check = evaluation.length_check,
            "Chapter evaluated"
        );
        Ok(evaluation)
    }

    fn reject(&self, number: ChapterNumber, attempt: u32, reason: String, score: Option<u8>) {
        self.events.publish(PipelineEvent::ChapterRejected {
            chapter: number.get(),
            attempt,
            reason,
            score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::fixtures;
    use crate::application::ports::LlmError;
    use crate::domain::novel::ChapterSummary;
    use crate::infrastructure::adapters::FakeLlmClient;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryNovelStore;

    fn small_policy() -> WritingPolicy {
        WritingPolicy {
            min_chapter_words: 30,
            excerpt_chars: 20,
            opening_lead_chars: 10,
            summary_input_chars: 100,
            ..WritingPolicy::default()
        }
    }

    /// 每段 12 个词，合并后 36 个词，不触发扩写
    fn sections() -> FakeLlmClient {
        FakeLlmClient::new()
            .with_fallback(
                AgentKind::SectionWriter,
                fixtures::section_json("opening", fixtures::words("s", 12)),
            )
            .with_fallback(AgentKind::Summary, fixtures::summary_json("归乡"))
    }

    fn command(n: u32) -> WriteChapter {
        WriteChapter {
            number: ChapterNumber::new(n).unwrap(),
            chapter: fixtures::chapter_outline("归乡"),
        }
    }

    fn handler(fake: Arc<FakeLlmClient>, events: Arc<EventPublisher>) -> WriteChapterHandler {
        WriteChapterHandler::new(fixtures::generator(fake), small_policy(), events)
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<PipelineEvent>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_accepted_on_first_attempt() {
        let fake = Arc::new(
            sections().with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(9, true, true)),
        );
        let events = EventPublisher::new().arc();
        let mut rx = events.subscribe();
        let mut store = InMemoryNovelStore::new();

        let report = handler(fake.clone(), events).handle(&mut store, command(1)).await.unwrap();
        assert_eq!(report.outcome, ChapterOutcome::Accepted);
        assert_eq!(report.attempts, 1);
        assert_eq!(report.last_score, Some(9));
        assert_eq!(report.word_count, 36);

        let number = ChapterNumber::first();
        assert!(store.chapter(number).is_some());
        assert!(store.chapter_summary(number).is_some());
        assert_eq!(store.chapter_report(number), Some(&report));
        let evaluations = fake.requests_for(AgentKind::QualityEvaluator);
        assert_eq!(evaluations.len(), 1);
        let prompt = evaluations[0].last_user_message().unwrap();
        let outline = fixtures::chapter_outline("归乡");
        assert!(prompt.contains(&outline.summary));
        assert!(prompt.contains("相遇, 冲突"));
        assert!(prompt.contains(&store.chapter(number).unwrap().content));

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(PipelineEvent::ChapterAccepted { chapter: 1, attempts: 1, score: 9, .. })
        ));
    }

    #[tokio::test]
    async fn test_length_failures_force_accept_on_third_attempt() {
        let fake = Arc::new(
            sections().with_fallback(AgentKind::QualityEvaluator, fixtures::evaluation_json(9, true, false)),
        );
        let events = EventPublisher::new().arc();
        let mut rx = events.subscribe();
        let mut store = InMemoryNovelStore::new();

        let report = handler(fake.clone(), events).handle(&mut store, command(1)).await.unwrap();
        assert_eq!(report.outcome, ChapterOutcome::ForceAccepted);
        assert_eq!(report.attempts, 3);

        // 从不进行第 4 次起草
        assert_eq!(fake.requests_for(AgentKind::SectionWriter).len(), 9);
        assert_eq!(fake.requests_for(AgentKind::QualityEvaluator).len(), 3);

        let number = ChapterNumber::first();
        assert!(store.chapter(number).is_some());
        assert!(store.chapter_summary(number).is_some());

        let events = drain(&mut rx);
        let rejected = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::ChapterRejected { reason, .. } if reason == "length"))
            .count();
        assert_eq!(rejected, 3);
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::ChapterForceAccepted { attempts: 3, .. })));
    }

    #[tokio::test]
    async fn test_low_score_is_rejected_even_when_passing() {
        let fake = Arc::new(
            sections()
                .with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(7, true, true))
                .with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(8, true, true)),
        );
        let mut store = InMemoryNovelStore::new();

        let report = handler(fake, EventPublisher::new().arc())
            .handle(&mut store, command(1))
            .await
            .unwrap();
        assert_eq!(report.outcome, ChapterOutcome::Accepted);
        assert_eq!(report.attempts, 2);
        assert_eq!(report.last_score, Some(8));
    }

    #[tokio::test]
    async fn test_feedback_carried_into_next_attempt() {
        let fake = Arc::new(
            sections()
                .with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(5, false, true))
                .with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(9, true, true)),
        );
        let mut store = InMemoryNovelStore::new();

        handler(fake.clone(), EventPublisher::new().arc())
            .handle(&mut store, command(1))
            .await
            .unwrap();

        let sections = fake.requests_for(AgentKind::SectionWriter);
        assert_eq!(sections.len(), 6);
        for request in &sections[..3] {
            assert!(!request.last_user_message().unwrap().contains("评分5的反馈"));
        }
        for request in &sections[3..] {
            assert!(request.last_user_message().unwrap().contains("评分5的反馈"));
        }
    }

    #[tokio::test]
    async fn test_evaluation_error_consumes_attempt_and_keeps_draft() {
        let fake = Arc::new(
            sections()
                .with_failure(AgentKind::QualityEvaluator, LlmError::Timeout)
                .with_raw_response(AgentKind::QualityEvaluator, "{\"score\": 42}")
                .with_failure(AgentKind::QualityEvaluator, LlmError::ServiceError("down".to_string())),
        );
        let mut store = InMemoryNovelStore::new();

        let report = handler(fake.clone(), EventPublisher::new().arc())
            .handle(&mut store, command(1))
            .await
            .unwrap();
        assert_eq!(report.outcome, ChapterOutcome::ForceAccepted);
        assert_eq!(report.attempts, 3);
        assert_eq!(report.last_score, None);
        assert!(store.chapter(ChapterNumber::first()).is_some());
    }

    #[tokio::test]
    async fn test_stale_evaluation_is_dropped_with_its_draft() {
        let fake = Arc::new(
            sections()
                .with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(5, false, true))
                .with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(6, false, true))
                .with_failure(AgentKind::QualityEvaluator, LlmError::Timeout),
        );
        let mut store = InMemoryNovelStore::new();

        let report = handler(fake, EventPublisher::new().arc())
            .handle(&mut store, command(1))
            .await
            .unwrap();
        assert_eq!(report.outcome, ChapterOutcome::ForceAccepted);
        assert_eq!(report.attempts, 3);
        assert_eq!(report.last_score, None);
        assert_eq!(report.last_feedback, None);
        assert!(store.chapter(ChapterNumber::first()).unwrap().notes.is_empty());
    }

    #[tokio::test]
    async fn test_report_survives_cancelled_summary() {
        let fake = Arc::new(
            FakeLlmClient::new()
                .with_fallback(
                    AgentKind::SectionWriter,
                    fixtures::section_json("opening", fixtures::words("s", 12)),
                )
                .with_fallback(AgentKind::QualityEvaluator, fixtures::evaluation_json(9, true, false))
                .with_failure(AgentKind::Summary, LlmError::Cancelled),
        );
        let mut store = InMemoryNovelStore::new();

        let err = handler(fake, EventPublisher::new().arc())
            .handle(&mut store, command(1))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let number = ChapterNumber::first();
        assert!(store.chapter(number).is_some());
        assert!(store.chapter_summary(number).is_none());
        let report = store.chapter_report(number).unwrap();
        assert_eq!(report.outcome, ChapterOutcome::ForceAccepted);
    }

    #[tokio::test]
    async fn test_all_drafts_failing_reports_failed() {
        let fake = Arc::new(
            FakeLlmClient::new()
                .with_failure(AgentKind::SectionWriter, LlmError::Timeout)
                .with_failure(AgentKind::SectionWriter, LlmError::Timeout)
                .with_failure(AgentKind::SectionWriter, LlmError::Timeout),
        );
        let events = EventPublisher::new().arc();
        let mut rx = events.subscribe();
        let mut store = InMemoryNovelStore::new();

        let report = handler(fake.clone(), events).handle(&mut store, command(1)).await.unwrap();
        assert_eq!(report.outcome, ChapterOutcome::Failed);
        assert_eq!(report.attempts, 3);
        assert_eq!(fake.request_count(), 3);
        assert!(store.chapter(ChapterNumber::first()).is_none());
        assert!(store.chapter_summary(ChapterNumber::first()).is_none());
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, PipelineEvent::ChapterFailed { chapter: 1, .. })));
    }

    #[tokio::test]
    async fn test_redraft_discards_previous_body() {
        let fake = Arc::new(
            FakeLlmClient::new()
                .with_response(AgentKind::SectionWriter, fixtures::section_json("opening", fixtures::words("old", 12)))
                .with_response(AgentKind::SectionWriter, fixtures::section_json("middle", fixtures::words("old", 12)))
                .with_response(AgentKind::SectionWriter, fixtures::section_json("ending", fixtures::words("old", 12)))
                .with_fallback(AgentKind::SectionWriter, fixtures::section_json("opening", fixtures::words("new", 12)))
                .with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(6, false, true))
                .with_response(AgentKind::QualityEvaluator, fixtures::evaluation_json(9, true, true))
                .with_fallback(AgentKind::Summary, fixtures::summary_json("归乡")),
        );
        let mut store = InMemoryNovelStore::new();

        handler(fake, EventPublisher::new().arc())
            .handle(&mut store, command(1))
            .await
            .unwrap();

        let stored = store.chapter(ChapterNumber::first()).unwrap();
        assert!(stored.content.contains("new0"));
        assert!(!stored.content.contains("old"));
    }

    #[tokio::test]
    async fn test_context_uses_previous_summary() {
        let fake = Arc::new(
            sections().with_fallback(AgentKind::QualityEvaluator, fixtures::evaluation_json(9, true, true)),
        );
        let mut store = InMemoryNovelStore::new();
        let first = ChapterNumber::first();
        store.set_chapter(first, ChapterContent::new("启程", "正文"));
        store
            .set_chapter_summary(
                first,
                ChapterSummary {
                    title: "启程".to_string(),
                    summary: "林远离开都市".to_string(),
                    ending: "列车驶入雾中".to_string(),
                },
            )
            .unwrap();

        handler(fake.clone(), EventPublisher::new().arc())
            .handle(&mut store, command(2))
            .await
            .unwrap();

        let opening = &fake.requests_for(AgentKind::SectionWriter)[0];
        let prompt = opening.last_user_message().unwrap();
        assert!(prompt.contains("林远离开都市"));
        assert!(prompt.contains("列车驶入雾中"));
        assert!(prompt.contains("第2章: 归乡"));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_chapter() {
        let fake = Arc::new(FakeLlmClient::new().with_failure(AgentKind::SectionWriter, LlmError::Cancelled));
        let mut store = InMemoryNovelStore::new();

        let err = handler(fake.clone(), EventPublisher::new().arc())
            .handle(&mut store, command(1))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(fake.request_count(), 1);
        assert!(store.chapter_report(ChapterNumber::first()).is_none());
    }
}
