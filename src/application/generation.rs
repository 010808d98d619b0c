//! Structured Generation - 结构化生成
//!
//! 在 LLM 端口之上统一处理：
//! - 每次调用的超时与取消
//! - 按输出结构解码并校验，结构不符时返回 `LlmError::SchemaMismatch`

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    AgentKind, ChatMessage, GenerateRequest, LlmEnginePort, LlmError, OutputSchema,
};
use crate::domain::novel::{
    ChapterContent, ChapterSection, ChapterSummary, CharacterRoster, NovelOutline,
    QualityEvaluation, MAX_SCORE, MIN_SCORE,
};

/// 可以由模型生成的结构
pub trait StructuredOutput: DeserializeOwned + Send {
    /// 结构名称
    const SCHEMA_NAME: &'static str;

    /// 对应的 JSON Schema
    fn json_schema() -> Value;

    /// 解码后的语义校验
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn output_schema() -> OutputSchema {
        OutputSchema {
            name: Self::SCHEMA_NAME,
            schema: Self::json_schema(),
        }
    }
}

/// 去掉模型常见的 Markdown 代码块包裹
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 跳过语言标记（如 ```json）
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// 解码并校验模型输出
pub fn decode<T: StructuredOutput>(raw: &str) -> Result<T, LlmError> {
    let body = strip_code_fence(raw);
    let value: T = serde_json::from_str(body)
        .map_err(|e| LlmError::schema_mismatch(T::SCHEMA_NAME, e.to_string()))?;
    value
        .validate()
        .map_err(|reason| LlmError::schema_mismatch(T::SCHEMA_NAME, reason))?;
    Ok(value)
}

/// 结构化生成器
///
/// 持有 LLM 端口、单次调用超时和整次运行的取消令牌
pub struct StructuredGenerator {
    engine: Arc<dyn LlmEnginePort>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl StructuredGenerator {
    pub fn new(engine: Arc<dyn LlmEnginePort>, timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            engine,
            timeout,
            cancel,
        }
    }

    /// 发送一次请求并解码为 `T`
    pub async fn generate<T: StructuredOutput>(
        &self,
        agent: AgentKind,
        messages: Vec<ChatMessage>,
    ) -> Result<T, LlmError> {
        if self.cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }

        let request = GenerateRequest {
            agent,
            messages,
            output: T::output_schema(),
        };

        tracing::debug!(
            agent = %agent,
            schema = T::SCHEMA_NAME,
            prompt_chars = request.prompt_chars(),
            "Sending generation request"
        );

        let response = tokio::select! {
            _ = self.cancel.cancelled() => return Err(LlmError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.engine.generate(request)) => {
                match result {
                    Ok(response) => response?,
                    Err(_) => {
                        tracing::warn!(agent = %agent, timeout_secs = self.timeout.as_secs(), "Generation timed out");
                        return Err(LlmError::Timeout);
                    }
                }
            }
        };

        decode::<T>(&response.content).inspect_err(|e| {
            tracing::warn!(agent = %agent, error = %e, "Generation output rejected");
        })
    }
}

fn string_array() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} 不能为空", field))
    } else {
        Ok(())
    }
}

impl StructuredOutput for NovelOutline {
    const SCHEMA_NAME: &'static str = "novel_outline";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "genre": { "type": "string" },
                "theme": { "type": "string" },
                "setting": { "type": "string" },
                "plot_summary": { "type": "string" },
                "chapters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "summary": { "type": "string" },
                            "key_events": string_array(),
                            "characters_involved": string_array(),
                            "setting": { "type": "string" }
                        },
                        "required": ["title", "summary", "key_events", "characters_involved", "setting"]
                    }
                },
                "characters": string_array()
            },
            "required": ["title", "genre", "theme", "setting", "plot_summary", "chapters", "characters"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        NovelOutline::validate(self).map_err(|e| e.to_string())
    }
}

impl StructuredOutput for CharacterRoster {
    const SCHEMA_NAME: &'static str = "character_roster";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "characters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "background": { "type": "string" },
                            "personality": { "type": "string" },
                            "goals": string_array(),
                            "conflicts": string_array(),
                            "arc": { "type": "string" }
                        },
                        "required": ["name", "background", "personality", "goals", "conflicts", "arc"]
                    }
                }
            },
            "required": ["characters"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        CharacterRoster::validate(self).map_err(|e| e.to_string())
    }
}

impl StructuredOutput for ChapterSection {
    const SCHEMA_NAME: &'static str = "chapter_section";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "section_type": { "type": "string", "enum": ["opening", "middle", "ending"] },
                "content": { "type": "string" }
            },
            "required": ["section_type", "content"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        non_empty("content", &self.content)
    }
}

impl StructuredOutput for ChapterContent {
    const SCHEMA_NAME: &'static str = "chapter_content";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "content": { "type": "string" },
                "notes": { "type": "string" }
            },
            "required": ["title", "content"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        non_empty("content", &self.content)
    }
}

impl StructuredOutput for ChapterSummary {
    const SCHEMA_NAME: &'static str = "chapter_summary";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "summary": { "type": "string" },
                "ending": { "type": "string" }
            },
            "required": ["title", "summary", "ending"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        non_empty("summary", &self.summary)?;
        non_empty("ending", &self.ending)
    }
}

impl StructuredOutput for QualityEvaluation {
    const SCHEMA_NAME: &'static str = "quality_evaluation";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "score": { "type": "integer", "minimum": MIN_SCORE, "maximum": MAX_SCORE },
                "feedback": { "type": "string" },
                "passes": { "type": "boolean" },
                "length_check": { "type": "boolean" }
            },
            "required": ["score", "feedback", "passes", "length_check"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        QualityEvaluation::validate(self).map_err(|e| e.to_string())
    }
}
