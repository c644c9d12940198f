//! Provider Registry for resolving configured models into LLM clients
//!
//! Models in `research.toml` reference providers by name:
//!
//! ```toml
//! [providers.openai]
//! type = "openai"
//! api_key_env = "OPENAI_API_KEY"
//! default_model = "gpt-4o-mini"
//!
//! [models.default]
//! provider = "openai"
//! model = "gpt-4o-mini"
//! ```
//!
//! The registry reads the live configuration on every lookup, so a
//! hot-reloaded file is picked up by the next agent run.

use crate::llm::client::{GenerationOptions, LLMClient, LLMClientFactory, Provider};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ConfigError, ConfigManager, ModelConfig, ProviderConfig};
use std::sync::Arc;

impl Provider {
    /// Build a provider from a model entry and the provider it references
    pub fn from_model_config(model: &ModelConfig, provider: &ProviderConfig) -> Result<Self> {
        let options = GenerationOptions {
            temperature: model.temperature,
            max_tokens: model.max_tokens,
        };

        match provider {
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                ..
            } => {
                let api_key = std::env::var(api_key_env)
                    .map_err(|_| ConfigError::MissingEnvVar(api_key_env.clone()))?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.model.clone(),
                    options,
                })
            }
            ProviderConfig::Ollama { base_url, .. } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.model.clone(),
                options,
            }),
        }
    }
}

/// Registry resolving `[models]` entries into providers
#[derive(Clone)]
pub struct ProviderRegistry {
    config: Arc<ConfigManager>,
}

impl ProviderRegistry {
    pub fn new(config: Arc<ConfigManager>) -> Self {
        Self { config }
    }

    /// Resolve the model -> provider chain for a model name
    pub fn provider_for_model(&self, model_name: &str) -> Result<Provider> {
        let config = self.config.config();

        let model_config = config.get_model(model_name).ok_or_else(|| {
            AppError::NotFound(format!("Model '{}' not found in configuration", model_name))
        })?;

        let provider_config = config.get_provider(&model_config.provider).ok_or_else(|| {
            AppError::from(ConfigError::MissingProvider(
                model_config.provider.clone(),
                model_name.to_string(),
            ))
        })?;

        Provider::from_model_config(model_config, provider_config)
    }
}

impl LLMClientFactory for ProviderRegistry {
    fn create_for_model(&self, model_name: &str) -> Result<Box<dyn LLMClient>> {
        let provider = self.provider_for_model(model_name)?;
        tracing::debug!(
            model_name,
            provider = provider.name(),
            model = provider.model(),
            "Creating LLM client"
        );
        provider.create_client()
    }
}
