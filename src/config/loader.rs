//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（quill.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::domain::novel::{MAX_SCORE, MIN_SCORE};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["quill", "quill.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `QUILL_`，层级分隔符 `__`）
/// 2. 配置文件（quill.toml 或 quill.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `QUILL_LLM__BASE_URL=http://127.0.0.1:8000/v1`
/// - `QUILL_LLM__MODEL=qwen2.5:32b`
/// - `QUILL_WRITING__MAX_ITERATIONS=5`
/// - `QUILL_OUTPUT__DIR=/data/novels`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("llm.base_url", "http://localhost:11434/v1")?
        .set_default("llm.api_key", "ollama")?
        .set_default("llm.model", "qwen2.5:14b")?
        .set_default("llm.timeout_secs", 600)?
        .set_default("writing.min_chapter_words", 4000)?
        .set_default("writing.max_iterations", 3)?
        .set_default("writing.pass_score", 8)?
        .set_default("writing.opening_words", 1500)?
        .set_default("writing.middle_words", 2000)?
        .set_default("writing.ending_words", 1500)?
        .set_default("writing.excerpt_chars", 500)?
        .set_default("writing.opening_lead_chars", 300)?
        .set_default("writing.summary_input_chars", 2000)?
        .set_default("output.dir", ".")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: QUILL_LLM__MODEL=qwen2.5:32b
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("QUILL")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.llm.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "LLM base URL cannot be empty".to_string(),
        ));
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "LLM model cannot be empty".to_string(),
        ));
    }

    if config.writing.max_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "Max iterations must be at least 1".to_string(),
        ));
    }

    if !(MIN_SCORE..=MAX_SCORE).contains(&config.writing.pass_score) {
        return Err(ConfigError::ValidationError(format!(
            "Pass score must be within {}-{}",
            MIN_SCORE, MAX_SCORE
        )));
    }

    if config.writing.min_chapter_words == 0 {
        return Err(ConfigError::ValidationError(
            "Minimum chapter words cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("LLM: {} ({})", config.llm.base_url, config.llm.model);
    tracing::info!("LLM Timeout: {}s", config.llm.timeout_secs);
    if let Some(temperature) = config.llm.temperature {
        tracing::info!("LLM Temperature: {}", temperature);
    }
    tracing::info!(
        "Chapter: >= {} words, {} iterations, pass score {}",
        config.writing.min_chapter_words,
        config.writing.max_iterations,
        config.writing.pass_score
    );
    tracing::info!(
        "Sections: {}/{}/{} words",
        config.writing.opening_words,
        config.writing.middle_words,
        config.writing.ending_words
    );
    tracing::info!("Output Directory: {:?}", config.output.dir);
    if let Some(filename) = &config.output.filename {
        tracing::info!("Output File: {}", filename);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
