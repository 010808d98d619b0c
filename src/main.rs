//! Quill - 多 Agent 长篇小说生成
//!
//! 一次运行生成一部小说：
//! - Domain: novel/（大纲、角色、章节、质量评估）
//! - Application: commands, queries, ports
//! - Infrastructure: adapters, memory, events

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncBufReadExt;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use quill::application::ports::{LlmEnginePort, NovelStorePort};
use quill::application::{ApplicationError, CreateNovel, CreateNovelHandler, StructuredGenerator, WritingPolicy};
use quill::config::{load_config, print_config, AppConfig};
use quill::infrastructure::adapters::{FileNovelExporter, HttpLlmClient, HttpLlmClientConfig};
use quill::infrastructure::events::EventPublisher;
use quill::infrastructure::memory::InMemoryNovelStore;

fn init_logging(config: &AppConfig) {
    let log_filter = format!("{},quill={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 小说描述来源：配置 > 命令行参数 > 标准输入的一行
async fn read_premise(config: &AppConfig) -> anyhow::Result<String> {
    if let Some(prompt) = config.novel.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(prompt.to_string());
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    println!("请描述你想要的小说（类型、主题、背景等）：");
    let mut line = String::new();
    tokio::io::BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read novel prompt from stdin")?;

    let premise = line.trim().to_string();
    if premise.is_empty() {
        anyhow::bail!("Novel prompt cannot be empty");
    }
    Ok(premise)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config);
    tracing::info!("Quill - 多 Agent 长篇小说生成");
    print_config(&config);

    let premise = read_premise(&config).await?;

    // 创建 LLM 引擎
    let llm_config = HttpLlmClientConfig::from(&config.llm);
    let engine = Arc::new(HttpLlmClient::new(llm_config)?);
    if !engine.health_check().await {
        tracing::warn!(base_url = %config.llm.base_url, "LLM service health check failed, continuing");
    }

    // Ctrl-C 取消整次运行
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Received shutdown signal, cancelling run");
                cancel.cancel();
            }
        });
    }

    let generator = Arc::new(StructuredGenerator::new(
        engine,
        Duration::from_secs(config.llm.timeout_secs),
        cancel,
    ));

    // 创建事件发布器，进度事件写入 debug 日志
    let events = EventPublisher::new().arc();
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => tracing::debug!(event = ?event, "Pipeline event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Pipeline event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let exporter = Arc::new(FileNovelExporter::new(&config.output.dir));
    let handler = CreateNovelHandler::new(
        generator,
        WritingPolicy::from(&config.writing),
        exporter,
        events,
    );

    let mut store = InMemoryNovelStore::new();
    let command = CreateNovel {
        premise,
        file_name: config.output.filename.clone(),
    };

    match handler.handle(&mut store, command).await {
        Ok(report) => {
            for chapter in &report.chapters {
                tracing::info!(
                    chapter = %chapter.number,
                    title = %chapter.title,
                    outcome = chapter.outcome.as_str(),
                    attempts = chapter.attempts,
                    words = chapter.word_count,
                    score = ?chapter.last_score,
                    "Chapter report"
                );
            }
            tracing::info!(
                run_id = %report.run_id,
                path = %report.export_path.display(),
                total_words = report.total_words(),
                "Novel saved"
            );
            println!("小说已保存至 {}", report.export_path.display());
            Ok(())
        }
        Err(ApplicationError::Cancelled) if store.outline().is_some() => {
            // 保存已接受的章节
            let path = handler
                .export_partial(&store, config.output.filename.clone())
                .await?;
            tracing::warn!(
                chapters = store.chapter_count(),
                path = %path.display(),
                "Run cancelled, partial novel saved"
            );
            println!("运行已取消，已保存部分内容至 {}", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
