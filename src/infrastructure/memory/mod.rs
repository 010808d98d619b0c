//! Memory Layer - In-Memory State Management
//!
//! 实现 NovelStore，保存一次生成运行内的全部产物

mod novel_store;

pub use novel_store::InMemoryNovelStore;
