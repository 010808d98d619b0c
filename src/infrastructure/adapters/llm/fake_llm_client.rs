//! Fake LLM Client - 用于测试的 LLM 客户端
//!
//! 按 Agent 预置响应队列，记录收到的每个请求，不实际调用模型服务

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{
    AgentKind, GenerateRequest, GenerateResponse, LlmEnginePort, LlmError,
};

/// Fake LLM Client
///
/// 每个 Agent 先消费预置队列，队列为空时使用该 Agent 的兜底响应；
/// 两者都没有时返回 `ServiceError`
#[derive(Default)]
pub struct FakeLlmClient {
    scripts: DashMap<AgentKind, VecDeque<Result<String, LlmError>>>,
    fallbacks: DashMap<AgentKind, String>,
    requests: Mutex<Vec<GenerateRequest>>,
    delay: Option<Duration>,
}

impl FakeLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个响应
    pub fn with_response(self, agent: AgentKind, value: serde_json::Value) -> Self {
        self.push(agent, Ok(value.to_string()));
        self
    }

    /// 追加一个原始文本响应（用于测试解码失败）
    pub fn with_raw_response(self, agent: AgentKind, raw: impl Into<String>) -> Self {
        self.push(agent, Ok(raw.into()));
        self
    }

    /// 追加一次失败
    pub fn with_failure(self, agent: AgentKind, error: LlmError) -> Self {
        self.push(agent, Err(error));
        self
    }

    /// 设置兜底响应，队列耗尽后重复返回
    pub fn with_fallback(self, agent: AgentKind, value: serde_json::Value) -> Self {
        self.fallbacks.insert(agent, value.to_string());
        self
    }

    /// 模拟推理延迟
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(&self, agent: AgentKind, response: Result<String, LlmError>) {
        self.scripts.entry(agent).or_default().push_back(response);
    }

    fn next_response(&self, agent: AgentKind) -> Result<String, LlmError> {
        if let Some(mut queue) = self.scripts.get_mut(&agent) {
            if let Some(response) = queue.pop_front() {
                return response;
            }
        }
        self.fallbacks
            .get(&agent)
            .map(|v| v.value().clone())
            .ok_or_else(|| LlmError::ServiceError(format!("no scripted response for {}", agent)))
    }

    /// 收到的全部请求
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 某个 Agent 收到的请求
    pub fn requests_for(&self, agent: AgentKind) -> Vec<GenerateRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.agent == agent)
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmEnginePort for FakeLlmClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let agent = request.agent;
        tracing::debug!(
            agent = %agent,
            prompt_chars = request.prompt_chars(),
            "FakeLlmClient: returning scripted response"
        );

        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.next_response(agent)
            .map(|content| GenerateResponse { content })
    }
}
