use crate::llm::client::{GenerationOptions, LLMClient, OutputSchema, TextStream};
use crate::types::{AppError, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use ollama_rs::{
    Ollama,
    generation::{
        chat::{ChatMessage, request::ChatMessageRequest},
        parameters::{FormatType, JsonStructure},
    },
    models::ModelOptions,
};
use serde_json::Value;

const DEFAULT_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
    options: GenerationOptions,
}

/// Split `http://host:port` into the host URL and port `Ollama::new` expects
fn split_base_url(base_url: &str) -> (String, u16) {
    let base_url = base_url.trim_end_matches('/');
    let (scheme, rest) = base_url.split_once("://").unwrap_or(("http", base_url));
    let authority = rest.split('/').next().unwrap_or(rest);

    match authority.rsplit_once(':') {
        Some((host, port)) => (
            format!("{}://{}", scheme, host),
            port.parse().unwrap_or(DEFAULT_PORT),
        ),
        None => (format!("{}://{}", scheme, authority), DEFAULT_PORT),
    }
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, options: GenerationOptions) -> Result<Self> {
        let (host, port) = split_base_url(&base_url);
        let client = Ollama::new(host, port);

        Ok(Self {
            client,
            model,
            options,
        })
    }

    fn request(&self, system: &str, prompt: &str) -> ChatMessageRequest {
        let messages = vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ];

        let mut options = ModelOptions::default().temperature(self.options.temperature);
        if let Some(max_tokens) = self.options.max_tokens {
            options = options.num_predict(max_tokens as i32);
        }

        ChatMessageRequest::new(self.model.clone(), messages).options(options)
    }

    async fn chat(&self, request: ChatMessageRequest) -> Result<String> {
        tracing::debug!(model = %self.model, "Ollama request");

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

/// Structured-output `format` built from a derived schema
fn structured_format(schema: &OutputSchema) -> Result<FormatType> {
    let schema = schemars::Schema::try_from(schema.schema.clone())
        .map_err(|_| AppError::LLM(format!("'{}' is not a JSON schema", schema.name)))?;
    Ok(FormatType::StructuredJson(Box::new(
        JsonStructure::new_for_schema(schema),
    )))
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(self.request(system, prompt)).await
    }

    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Value> {
        let request = self
            .request(system, prompt)
            .format(structured_format(schema)?);
        let content = self.chat(request).await?;

        serde_json::from_str(&content).map_err(|e| {
            AppError::InvalidOutput(format!("'{}' is not valid JSON: {}", schema.name, e))
        })
    }

    async fn stream_with_system(&self, system: &str, prompt: &str) -> Result<TextStream> {
        let request = self.request(system, prompt);

        let mut stream_response = self
            .client
            .send_chat_messages_stream(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama stream error: {}", e)))?;

        // The answer is complete only once a chunk reports `done`
        let output_stream = stream! {
            let mut done = false;
            while let Some(chunk_result) = stream_response.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        if !chunk.message.content.is_empty() {
                            yield Ok(chunk.message.content);
                        }
                        if chunk.done {
                            done = true;
                            break;
                        }
                    }
                    Err(_) => {
                        yield Err(AppError::LLM("Stream chunk error".to_string()));
                        return;
                    }
                }
            }
            if !done {
                yield Err(AppError::LLM("stream ended before completion".to_string()));
            }
        };

        Ok(Box::new(Box::pin(output_stream)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
