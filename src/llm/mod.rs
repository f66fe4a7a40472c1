//! Summary generation through a hosted LLM.

mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::SummaryTier;

pub use client::{build_prompt, tier_prompt, LlmClient, LlmConfig, LlmProvider, TRUNCATION_SUFFIX};

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to reach the LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Text returned by a [`Summarizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutput {
    pub text: String,
    /// False when `text` is a placeholder (no credentials) rather than model output.
    pub generated: bool,
}

impl SummaryOutput {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            generated: true,
        }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            generated: false,
        }
    }
}

/// Produces a summary of book text for a tier.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, tier: SummaryTier) -> Result<SummaryOutput, LlmError>;
}
