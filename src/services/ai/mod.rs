//! External AI service abstraction
//!
//! The AI service owns recommendations, tutoring chat, learning paths and
//! summaries. Everything here is a thin proxy; the only local decision is
//! whether a failure means the service is unreachable, which drives the
//! popular-course fallback.

use std::time::Duration;

use serde_json::Value;

use crate::models::ChatbotForward;

pub mod http;

pub use http::HttpAiClient;

/// Failures talking to the AI service
#[derive(thiserror::Error, Debug)]
pub enum AiError {
    /// Timed out or could not connect
    #[error("AI service unavailable: {0}")]
    Unavailable(String),

    #[error("AI service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI service request failed: {0}")]
    Request(String),
}

impl AiError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AiError::Unavailable(_))
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            AiError::Unavailable(e.to_string())
        } else {
            AiError::Request(e.to_string())
        }
    }
}

/// Client for the external AI service
///
/// Responses are passed through as raw JSON; the API layer forwards them
/// unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AiClient: Send + Sync {
    /// Personalised course recommendations for a user
    async fn recommendations(&self, user_id: i64, timeout: Duration) -> Result<Value, AiError>;

    /// One tutoring chat turn
    async fn chatbot(&self, request: ChatbotForward) -> Result<Value, AiError>;

    async fn learning_path(&self, user_id: i64) -> Result<Value, AiError>;

    async fn full_recommendations(&self, user_id: i64) -> Result<Value, AiError>;

    /// Summarises free text
    async fn summarize(&self, text: String) -> Result<Value, AiError>;

    /// Client name for logging
    fn name(&self) -> &'static str;
}
