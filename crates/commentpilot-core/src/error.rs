//! Engine errors.

use thiserror::Error;

use commentpilot_protocols::{DomError, GenerationError, NodeId, SettingsError};

/// Failure of one generate-and-insert activation.
#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to write the comment: {0}")]
    Dom(#[from] DomError),
}

impl ActivationError {
    /// Message shown to the user through the status sink.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => {
                "Please set your Gemini API key in the extension settings".to_string()
            }
            Self::Generation(GenerationError::Network(_)) => {
                "Could not reach the text generation service".to_string()
            }
            Self::Generation(GenerationError::RequestFailed { status, .. }) => format!(
                "Failed to generate comment (status {}). Please check your API key.",
                status
            ),
            Self::Generation(GenerationError::MalformedResponse(_)) => {
                "The text generation service returned an unexpected response".to_string()
            }
            Self::Dom(_) => "Could not insert the comment into the page".to_string(),
        }
    }
}

/// Failure to add a control next to one target during a scan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsertionError {
    #[error("No insertion anchor for {0}")]
    NoAnchor(NodeId),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Failure to start a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Host is not enabled for augmentation: {0}")]
    HostNotAllowed(String),

    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
