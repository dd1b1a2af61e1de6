//! Language model provider trait for abstracting LLM interactions.
//!
//! This module defines the [`LlmProvider`] trait that enables support for
//! multiple model backends (Gemini, OpenAI, Ollama, etc.) without changing
//! the summarizer stage, and lets tests substitute deterministic doubles.
//!
//! # Implementing a New Provider
//!
//! To add a new provider:
//!
//! 1. Create a new file in `src/llm/` (e.g., `openai.rs`)
//! 2. Implement the [`LlmProvider`] trait for your provider struct
//! 3. Export the provider in `src/llm/mod.rs`
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabula_insights::llm::GeminiProvider;
//! use tabula_insights::Pipeline;
//!
//! // Create a provider
//! let provider = GeminiProvider::new("your-api-key".to_string())?;
//!
//! // Use it with the pipeline
//! let pipeline = Pipeline::builder()
//!     .llm_provider(Arc::new(provider))
//!     .build()?;
//! ```

use crate::error::Result;

/// Trait for language model providers that can summarize dataset insights.
///
/// This trait abstracts the interaction with an LLM backend. The provider
/// receives a fully built prompt and returns plain text; prompt
/// construction stays in the summarizer stage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
///
/// # Error Handling
///
/// Implementations should return [`PipelineError::ModelUnavailable`] for
/// transport failures, timeouts, and blocked or empty replies. The
/// summarizer falls back to a templated summary when the provider fails,
/// so a provider error never fails a pipeline run.
///
/// [`PipelineError::ModelUnavailable`]: crate::error::PipelineError::ModelUnavailable
pub trait LlmProvider: Send + Sync {
    /// Generate a natural-language summary from the given prompt.
    ///
    /// # Returns
    ///
    /// The model's reply as plain text. Callers treat an empty or
    /// whitespace-only reply as a failure.
    fn generate_summary(&self, prompt: &str) -> Result<String>;

    /// Get the provider name for logging and debugging.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_eq!(provider.name(), "Gemini");
    /// ```
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}
