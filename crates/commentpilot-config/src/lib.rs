//! # CommentPilot Config
//!
//! Configuration management for CommentPilot: the TOML schema, a loader with
//! environment variable expansion, validation, and the settings stores that
//! back the shared user settings.

mod error;
mod loader;
mod schema;
mod store;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use store::{FileSettingsStore, MemorySettingsStore};
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
