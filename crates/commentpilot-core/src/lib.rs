//! # CommentPilot Core
//!
//! The comment assistant engine: everything that runs inside a page.
//!
//! ## Components
//!
//! - [`ContextExtractor`] - Finds the post text a comment box belongs to
//! - [`build_prompt`] - Turns context and tone into a prompt
//! - [`InjectionController`] - Adds controls to comment boxes and runs the
//!   generate-and-insert flow
//! - [`ChangeWatcher`] - Turns page mutations and navigation into debounced
//!   scan requests
//! - [`AutoActionTimer`] - Optional recurring auto-like
//! - [`LiveSettings`] - Settings snapshot kept fresh from the store
//! - [`Session`] - Wires all of the above to one page
//!
//! ## Embedding
//!
//! The engine does not drive a browser itself. A host integration implements
//! [`PageDom`](commentpilot_protocols::PageDom) for its page (the
//! `commentpilot-page` crate provides an in-memory `Document`), then calls
//! [`Session::start`] with a settings store, a text generator and a status
//! sink. The `commentpilot` binary only covers the one-shot commands.

pub mod auto_action;
pub mod controller;
pub mod error;
pub mod extractor;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod status;
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_support;

pub use auto_action::AutoActionTimer;
pub use controller::{ActivationOutcome, ControlState, InjectionController, ScanReport};
pub use error::{ActivationError, InsertionError, SessionError};
pub use extractor::ContextExtractor;
pub use prompt::{build_prompt, style_prefix};
pub use session::Session;
pub use settings::LiveSettings;
pub use status::{BroadcastStatusSink, TracingStatusSink};
pub use watcher::{ChangeWatcher, ScanDebouncer, ScanRequester, WatchEvent, WatchReason};
