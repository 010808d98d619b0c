//! Event Publisher Implementation
//!
//! 基于 broadcast 的流水线进度事件推送

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{PipelineEvent, PipelineEventSink};

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<PipelineEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅事件
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.channel.subscribe()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineEventSink for EventPublisher {
    fn publish(&self, event: PipelineEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(event = ?e.0, "No subscribers for pipeline event");
        }
    }
}
