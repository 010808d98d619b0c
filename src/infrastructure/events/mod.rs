//! Events Layer - 流水线进度事件

mod publisher;

pub use publisher::EventPublisher;
