use crate::models::RawResponse;
use crate::services::prompt::ReportRequest;
use async_trait::async_trait;

/// Failure kinds reported by a generation backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// The credential was missing or rejected.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// The transport gave up waiting for an answer.
    #[error("generation timed out")]
    TimedOut,

    /// Network, quota or service-side failure.
    #[error("generation failed: {message}")]
    Failed {
        message: String,
        /// Whatever body the service returned, when there was one.
        partial_text: Option<String>,
    },
}

impl GenerationError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            partial_text: None,
        }
    }

    pub fn failed_with_text(message: impl Into<String>, partial_text: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            partial_text: Some(partial_text.into()),
        }
    }
}

/// Search-augmented text generator that answers a [`ReportRequest`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &ReportRequest) -> Result<RawResponse, GenerationError>;
}
