//! Query Handlers 实现

mod context_handlers;

pub use context_handlers::*;
