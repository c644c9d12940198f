//! OpenAI chat completions client built on `async-openai`.
//!
//! Any compatible endpoint (Azure, OpenRouter, vLLM, Ollama's `/v1`) works by
//! changing `api_base`.

use crate::llm::client::{GenerationOptions, LLMClient, OutputSchema, TextStream};
use crate::types::{AppError, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;

pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    options: GenerationOptions,
}

impl OpenAIClient {
    pub fn new(
        api_key: String,
        api_base: String,
        model: String,
        options: GenerationOptions,
    ) -> Result<Self> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base.trim_end_matches('/'));

        Ok(Self {
            client: Client::with_config(config),
            model,
            options,
        })
    }

    fn request(
        &self,
        system: &str,
        prompt: &str,
        response_format: Option<ResponseFormat>,
        stream: bool,
    ) -> Result<CreateChatCompletionRequest> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(system)),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(prompt)),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(self.options.temperature);
        if let Some(max_tokens) = self.options.max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        if let Some(format) = response_format {
            args.response_format(format);
        }
        if stream {
            args.stream(true);
        }

        args.build()
            .map_err(|e| AppError::LLM(format!("Failed to build request: {}", e)))
    }

    async fn complete(&self, request: CreateChatCompletionRequest) -> Result<String> {
        tracing::debug!(model = %self.model, "OpenAI request");

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI API error: {}", e)))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))?;

        if let Some(refusal) = message.refusal {
            return Err(AppError::LLM(format!("Model refused: {}", refusal)));
        }

        message
            .content
            .ok_or_else(|| AppError::LLM("OpenAI response had no content".to_string()))
    }
}

/// `response_format` asking for strict conformance to `schema`
fn json_schema_format(schema: &OutputSchema) -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: None,
            name: schema.name.clone(),
            schema: Some(schema.schema.clone()),
            strict: Some(true),
        },
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(self.request(system, prompt, None, false)?)
            .await
    }

    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Value> {
        let request = self.request(system, prompt, Some(json_schema_format(schema)), false)?;
        let content = self.complete(request).await?;

        serde_json::from_str(&content).map_err(|e| {
            AppError::InvalidOutput(format!("'{}' is not valid JSON: {}", schema.name, e))
        })
    }

    async fn stream_with_system(&self, system: &str, prompt: &str) -> Result<TextStream> {
        let request = self.request(system, prompt, None, true)?;
        tracing::debug!(model = %self.model, "OpenAI stream request");

        let mut stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI stream error: {}", e)))?;

        // A choice carrying `finish_reason` marks a completed answer
        let result_stream = stream! {
            let mut finished = false;
            while let Some(result) = stream.next().await {
                match result {
                    Ok(response) => {
                        for choice in response.choices {
                            if let Some(content) = choice.delta.content
                                && !content.is_empty()
                            {
                                yield Ok(content);
                            }
                            if choice.finish_reason.is_some() {
                                finished = true;
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(AppError::LLM(format!("Stream error: {}", e)));
                        return;
                    }
                }
            }
            if !finished {
                yield Err(AppError::LLM("stream ended before completion".to_string()));
            }
        };

        Ok(Box::new(Box::pin(result_stream)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
