//! Generative model clients
//!
//! Extraction code depends on the [`GenerativeModel`] trait only; the Gemini
//! REST client is the production implementation.

mod gemini_client;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini_client::GeminiClient;

/// A single schema-constrained generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Instruction describing the task and output rules
    pub system_instruction: String,
    /// User turn content
    pub prompt: String,
    /// Response schema the model output must conform to (OpenAPI subset)
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum GenerativeModelError {
    #[error("Generative model API key is not configured")]
    MissingApiKey,

    #[error("Generative model request timed out")]
    Timeout,

    #[error("Generative model request failed: {0}")]
    Transport(String),

    #[error("Generative model returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generative model blocked the request: {0}")]
    Blocked(String),

    #[error("Generative model returned no content")]
    EmptyResponse,
}

/// Text generation backend constrained to JSON output
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Whether credentials are present. Callers check this before doing any
    /// other work so a missing key is reported immediately.
    fn is_configured(&self) -> bool {
        true
    }

    /// Run one generation and return the raw JSON text produced by the model
    async fn generate_json(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerativeModelError>;
}
