//! 测试用的样例数据与假 LLM 响应

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::generation::StructuredGenerator;
use crate::application::ports::LlmEnginePort;
use crate::domain::novel::{ChapterOutline, Character, NovelOutline};

/// 生成恰好 `count` 个空白分隔词元的文本，`tag` 用于区分来源
pub fn words(tag: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{}{}", tag, i))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn chapter_outline(title: &str) -> ChapterOutline {
    ChapterOutline {
        title: title.to_string(),
        summary: format!("{}的摘要", title),
        key_events: vec!["相遇".to_string(), "冲突".to_string()],
        characters_involved: vec!["林远".to_string()],
        setting: "山城".to_string(),
    }
}

pub fn outline(chapter_count: usize) -> NovelOutline {
    NovelOutline {
        title: "雾中城".to_string(),
        genre: "悬疑".to_string(),
        theme: "记忆与真相".to_string(),
        setting: "多雾的山城".to_string(),
        plot_summary: "侦探林远回到故乡追查一桩旧案".to_string(),
        chapters: (1..=chapter_count)
            .map(|i| chapter_outline(&format!("第{}幕", i)))
            .collect(),
        characters: vec!["林远".to_string(), "苏晴".to_string()],
    }
}

pub fn characters() -> Vec<Character> {
    vec![
        Character {
            name: "林远".to_string(),
            background: "离乡多年的侦探".to_string(),
            personality: "冷静而固执".to_string(),
            goals: vec!["查明旧案".to_string(), "与父亲和解".to_string(), "离开山城".to_string()],
            conflicts: vec!["对故乡的抗拒".to_string()],
            arc: "从逃避到面对".to_string(),
        },
        Character {
            name: "苏晴".to_string(),
            background: "本地记者".to_string(),
            personality: "敏锐".to_string(),
            goals: vec!["独家报道".to_string()],
            conflicts: vec![],
            arc: "学会信任".to_string(),
        },
    ]
}

pub fn outline_json(chapter_count: usize) -> Value {
    serde_json::to_value(outline(chapter_count)).unwrap()
}

pub fn roster_json() -> Value {
    json!({ "characters": characters() })
}

pub fn section_json(kind: &str, content: String) -> Value {
    json!({ "section_type": kind, "content": content })
}

pub fn chapter_json(title: &str, content: String) -> Value {
    json!({ "title": title, "content": content })
}

pub fn evaluation_json(score: u8, passes: bool, length_check: bool) -> Value {
    json!({
        "score": score,
        "feedback": format!("评分{}的反馈", score),
        "passes": passes,
        "length_check": length_check,
    })
}

pub fn summary_json(title: &str) -> Value {
    json!({
        "title": title,
        "summary": format!("{}的摘要内容", title),
        "ending": format!("{}的结尾片段", title),
    })
}

pub fn generator(engine: Arc<dyn LlmEnginePort>) -> Arc<StructuredGenerator> {
    Arc::new(StructuredGenerator::new(
        engine,
        Duration::from_secs(5),
        CancellationToken::new(),
    ))
}
