//! Text-generation provider trait definition.

use async_trait::async_trait;

use crate::error::GenerationError;

/// Core trait for text-generation services.
///
/// Implementations issue exactly one request per call; retrying is the
/// caller's decision.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the provider ID.
    fn id(&self) -> &str;

    /// Generate text for `prompt`, authenticating with `api_key`.
    ///
    /// `api_key` is expected to be non-empty.
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, GenerationError>;
}
