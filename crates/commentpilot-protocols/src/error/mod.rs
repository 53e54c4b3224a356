//! Error types for the CommentPilot protocol layer.

mod generation;
mod page;
mod settings;

pub use generation::*;
pub use page::*;
pub use settings::*;
