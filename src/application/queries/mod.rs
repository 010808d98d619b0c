//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：只读取存储，不产生副作用

mod context_queries;

pub mod handlers;

pub use context_queries::*;
