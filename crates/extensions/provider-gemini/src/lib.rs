//! # CommentPilot Provider - Gemini
//!
//! Google Gemini text generation for CommentPilot.

mod client;
mod types;

pub use client::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use types::*;
