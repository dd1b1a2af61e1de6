//! Language model integration for the summarizer stage.
//!
//! This module provides a trait-based abstraction for LLM providers,
//! allowing the summarizer to work with multiple model backends and
//! letting tests inject deterministic doubles.
//!
//! # Feature Flag
//!
//! This module requires the `ai` feature flag to be enabled for the concrete
//! provider implementations. The [`LlmProvider`] trait is always available
//! for custom implementations.
//!
//! ```toml
//! # Enable AI support (default)
//! tabula-insights = { version = "0.1", features = ["ai"] }
//!
//! # Disable AI support for smaller binary
//! tabula-insights = { version = "0.1", default-features = false }
//! ```
//!
//! Without the `ai` feature the summarizer always produces the templated
//! fallback summary.
//!
//! # Architecture
//!
//! The module is built around the [`LlmProvider`] trait, which defines the
//! interface for turning a prompt into summary text. One concrete
//! implementation is provided:
//!
//! - [`GeminiProvider`] - Google Gemini API (requires `ai` feature)
//!
//! # Adding a New Provider
//!
//! To add support for a new provider:
//!
//! 1. Create a new file (e.g., `src/llm/openai.rs`)
//! 2. Implement the [`LlmProvider`] trait
//! 3. Export the new provider in this module
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabula_insights::llm::GeminiProvider;
//! use tabula_insights::Pipeline;
//!
//! // Create a provider
//! let provider = Arc::new(GeminiProvider::new("your-api-key")?);
//!
//! // Use it with the pipeline
//! let analysis = Pipeline::builder()
//!     .llm_provider(provider)
//!     .build()?
//!     .process(path, "orders.csv")?;
//! ```

// Provider trait is always available (for custom implementations)
mod provider;
pub use provider::LlmProvider;

// Concrete providers require the "ai" feature
#[cfg(feature = "ai")]
mod gemini;

#[cfg(feature = "ai")]
pub use gemini::{GeminiConfig, GeminiConfigBuilder, GeminiProvider};
