//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod chapter_handlers;
mod drafting_handlers;
mod export_handlers;
mod novel_handlers;
mod outline_handlers;
mod summary_handlers;

#[cfg(test)]
pub(crate) mod fixtures;

pub use chapter_handlers::*;
pub use drafting_handlers::*;
pub use export_handlers::*;
pub use novel_handlers::*;
pub use outline_handlers::*;
pub use summary_handlers::*;
