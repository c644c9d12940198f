//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for interacting with the Large
//! Language Model (LLM) providers the research agents run on. It abstracts
//! away provider-specific wire formats behind common traits.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`LLMClientFactory`] - Creates clients for configured model names
//! - [`ProviderRegistry`] - Resolves `[models]` -> `[providers]` from `research.toml`
//!
//! # Example
//!
//! ```ignore
//! use deep_research::llm::{LLMClientFactory, ProviderRegistry};
//!
//! let registry = ProviderRegistry::new(config_manager);
//! let client = registry.create_for_model("default")?;
//!
//! let response = client.generate_with_system("Be terse.", "What is 2+2?").await?;
//! println!("{}", response);
//! ```
//!
//! # Streaming
//!
//! Both providers stream through `stream_with_system`, which returns a
//! [`TextStream`] of text fragments in arrival order.

/// Core LLM client trait and provider selection.
pub mod client;
/// Ollama client on `ollama-rs`.
pub mod ollama;
/// OpenAI-compatible client on `async-openai`.
pub mod openai;
/// Registry resolving configured models into clients.
pub mod provider_registry;

pub use client::{
    GenerationOptions, LLMClient, LLMClientFactory, OutputSchema, Provider, TextStream,
};
pub use provider_registry::ProviderRegistry;
