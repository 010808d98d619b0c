//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::policy::WritingPolicy;
use crate::infrastructure::adapters::HttpLlmClientConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 模型服务配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 写作策略配置
    #[serde(default)]
    pub writing: WritingConfig,

    /// 导出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 小说输入配置
    #[serde(default)]
    pub novel: NovelConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 模型服务配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// 服务基础 URL，例如 http://localhost:11434/v1
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_api_key")]
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// 采样温度，未设置时使用服务端默认值
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_llm_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_api_key() -> String {
    "ollama".to_string()
}

fn default_llm_model() -> String {
    "qwen2.5:14b".to_string()
}

fn default_llm_timeout() -> u64 {
    600 // 长章节生成可能需要数分钟
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: default_llm_api_key(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            temperature: None,
        }
    }
}

impl From<&LlmConfig> for HttpLlmClientConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
        }
    }
}

/// 写作策略配置
#[derive(Debug, Clone, Deserialize)]
pub struct WritingConfig {
    #[serde(default = "default_min_chapter_words")]
    pub min_chapter_words: usize,

    /// 每章最多起草次数
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// 质量及格分（1-10）
    #[serde(default = "default_pass_score")]
    pub pass_score: u8,

    #[serde(default = "default_opening_words")]
    pub opening_words: usize,

    #[serde(default = "default_middle_words")]
    pub middle_words: usize,

    #[serde(default = "default_ending_words")]
    pub ending_words: usize,

    /// 衔接片段长度（字符）
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    #[serde(default = "default_opening_lead_chars")]
    pub opening_lead_chars: usize,

    #[serde(default = "default_summary_input_chars")]
    pub summary_input_chars: usize,
}

fn default_min_chapter_words() -> usize {
    4000
}

fn default_max_iterations() -> u32 {
    3
}

fn default_pass_score() -> u8 {
    8
}

fn default_opening_words() -> usize {
    1500
}

fn default_middle_words() -> usize {
    2000
}

fn default_ending_words() -> usize {
    1500
}

fn default_excerpt_chars() -> usize {
    500
}

fn default_opening_lead_chars() -> usize {
    300
}

fn default_summary_input_chars() -> usize {
    2000
}

impl Default for WritingConfig {
    fn default() -> Self {
        Self {
            min_chapter_words: default_min_chapter_words(),
            max_iterations: default_max_iterations(),
            pass_score: default_pass_score(),
            opening_words: default_opening_words(),
            middle_words: default_middle_words(),
            ending_words: default_ending_words(),
            excerpt_chars: default_excerpt_chars(),
            opening_lead_chars: default_opening_lead_chars(),
            summary_input_chars: default_summary_input_chars(),
        }
    }
}

impl From<&WritingConfig> for WritingPolicy {
    fn from(config: &WritingConfig) -> Self {
        Self {
            min_chapter_words: config.min_chapter_words,
            max_iterations: config.max_iterations,
            pass_score: config.pass_score,
            opening_words: config.opening_words,
            middle_words: config.middle_words,
            ending_words: config.ending_words,
            excerpt_chars: config.excerpt_chars,
            opening_lead_chars: config.opening_lead_chars,
            summary_input_chars: config.summary_input_chars,
        }
    }
}

/// 导出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// 导出文件名，未设置时由小说标题生成
    #[serde(default)]
    pub filename: Option<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            filename: None,
        }
    }
}

/// 小说输入配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NovelConfig {
    /// 小说描述；未设置时依次读取命令行参数和标准输入
    #[serde(default)]
    pub prompt: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
