//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for the providers used by the
//! research agents:
//! - **OpenAI**: chat completions (and any compatible endpoint), JSON-schema
//!   structured output, SSE streaming (via `async-openai`)
//! - **Ollama**: local inference with `format` schemas and NDJSON streaming
//!   (via `ollama-rs`)

use crate::types::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde_json::Value;

/// A boxed stream of text fragments produced by a streaming completion
pub type TextStream = Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate a JSON value conforming to `schema`
    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Value>;

    /// Stream a completion with system prompt
    async fn stream_with_system(&self, system: &str, prompt: &str) -> Result<TextStream>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Sampling options shared by every provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// A named JSON schema the model output must conform to
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl OutputSchema {
    /// Derive the schema of `T` with schemars
    ///
    /// Meta keys (`$schema`, `title`) are stripped since providers reject or
    /// ignore them inside `response_format`.
    pub fn of<T: JsonSchema>(name: &str) -> Self {
        let mut schema =
            serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| Value::Null);
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
            obj.remove("title");
        }

        Self {
            name: name.to_string(),
            schema,
        }
    }
}

/// Provider enum for runtime selection
///
/// # Supported Providers
///
/// | Provider | Streaming | Structured output |
/// |----------|-----------|-------------------|
/// | OpenAI | SSE | `response_format: json_schema` |
/// | Ollama | NDJSON | `format: <schema>` |
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    ///     options: GenerationOptions::default(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        options: GenerationOptions,
    },

    /// Ollama local LLM provider
    ///
    /// Structured output needs a model with JSON mode support
    /// (`llama3.1`, `llama3.2`, `qwen2.5`, ...).
    Ollama {
        base_url: String,
        model: String,
        options: GenerationOptions,
    },
}

impl Provider {
    /// Create a client instance for this provider
    pub fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                options,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *options,
            )?)),

            Provider::Ollama {
                base_url,
                model,
                options,
            } => Ok(Box::new(super::ollama::OllamaClient::new(
                base_url.clone(),
                model.clone(),
                *options,
            )?)),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model identifier sent to the provider
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

/// Factory abstraction over client creation
///
/// The research agents resolve their client through this trait, which lets
/// tests substitute canned clients for real providers.
pub trait LLMClientFactory: Send + Sync {
    /// Create a client for a model name defined in `[models]`
    fn create_for_model(&self, model_name: &str) -> Result<Box<dyn LLMClient>>;
}
