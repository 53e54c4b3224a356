//! # CommentPilot Protocols
//!
//! Core protocol definitions (traits) for CommentPilot.
//! Contains only interface definitions and the value types that cross them.
//!
//! ## Core Traits
//!
//! - [`PageDom`] - Host page the assistant augments
//! - [`TextGenerator`] - External text-generation service
//! - [`SettingsStore`] - Shared configuration store with change notifications
//! - [`StatusSink`] - Fire-and-forget status display

pub mod error;
pub mod page;
pub mod provider;
pub mod settings;
pub mod status;

// Re-export core traits
pub use page::{ElementLike, NodeId, PageDom, PageEvent, Selector};
pub use provider::TextGenerator;
pub use settings::{LanguageStyle, SettingChange, SettingKey, Settings, SettingsStore};
pub use status::{StatusKind, StatusReport, StatusSink};
pub use error::{DomError, GenerationError, SelectorError, SettingsError};
