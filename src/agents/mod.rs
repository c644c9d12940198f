//! Declarative agents
//!
//! An agent here is data: a name, instructions, a model reference and an
//! optional output schema ([`AgentSpec`]). [`AgentRunner`] executes a spec
//! against whatever [`LLMClientFactory`] it was built with, so the same
//! declaration runs on OpenAI, Ollama or a test double.
//!
//! The research flow uses four agents, see [`AgentKind`].

/// Web search planning schema.
pub mod planner;
/// Built-in agent instructions.
pub mod prompts;
/// Clarifying question schema and generator.
pub mod questions;

use crate::llm::{LLMClientFactory, OutputSchema, TextStream};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{AgentConfig, ResearchConfig};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub use planner::{WebSearchItem, WebSearchPlan};
pub use questions::{QUESTION_COUNT, Question, QuestionSet, Questions};

/// The agents taking part in a research session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Topic -> three clarifying questions
    Questions,
    /// Enriched query -> list of web searches
    Planner,
    /// One search's raw results -> short summary
    Search,
    /// Query + summaries -> markdown report
    Writer,
}

impl AgentKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Questions => "Questions Generator Agent",
            AgentKind::Planner => "Planner Agent",
            AgentKind::Search => "Search Agent",
            AgentKind::Writer => "Writer Agent",
        }
    }

    fn default_instructions(&self) -> &'static str {
        match self {
            AgentKind::Questions => prompts::QUESTIONS_INSTRUCTIONS,
            AgentKind::Planner => prompts::PLANNER_INSTRUCTIONS,
            AgentKind::Search => prompts::SEARCH_INSTRUCTIONS,
            AgentKind::Writer => prompts::WRITER_INSTRUCTIONS,
        }
    }

    fn output_schema(&self) -> Option<OutputSchema> {
        match self {
            AgentKind::Questions => Some(OutputSchema::of::<Questions>("questions")),
            AgentKind::Planner => Some(OutputSchema::of::<WebSearchPlan>("web_search_plan")),
            AgentKind::Search | AgentKind::Writer => None,
        }
    }

    fn config<'a>(&self, config: &'a ResearchConfig) -> &'a AgentConfig {
        match self {
            AgentKind::Questions => &config.agents.questions,
            AgentKind::Planner => &config.agents.planner,
            AgentKind::Search => &config.agents.search,
            AgentKind::Writer => &config.agents.writer,
        }
    }

    /// Assemble the declaration of this agent from configuration
    pub fn spec(&self, config: &ResearchConfig) -> AgentSpec {
        let agent_config = self.config(config);
        AgentSpec {
            name: self.display_name().to_string(),
            instructions: agent_config
                .instructions
                .clone()
                .unwrap_or_else(|| self.default_instructions().to_string()),
            model: agent_config.model.clone(),
            output: self.output_schema(),
        }
    }
}

/// Declarative agent configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub name: String,
    pub instructions: String,
    /// Name of a `[models]` entry
    pub model: String,
    /// Schema the output must satisfy; plain text when `None`
    pub output: Option<OutputSchema>,
}

/// Executes [`AgentSpec`]s
#[derive(Clone)]
pub struct AgentRunner {
    factory: Arc<dyn LLMClientFactory>,
}

impl AgentRunner {
    pub fn new(factory: Arc<dyn LLMClientFactory>) -> Self {
        Self { factory }
    }

    /// Run a structured agent and decode its output into `T`
    pub async fn run_structured<T: DeserializeOwned>(
        &self,
        spec: &AgentSpec,
        input: &str,
    ) -> Result<T> {
        let schema = spec.output.as_ref().ok_or_else(|| {
            AppError::Internal(format!("{} declares no output schema", spec.name))
        })?;

        let client = self.factory.create_for_model(&spec.model)?;
        tracing::debug!(agent = %spec.name, model = client.model_name(), "Running structured agent");

        let value = client
            .generate_structured(&spec.instructions, input, schema)
            .await?;

        serde_json::from_value(value).map_err(|e| {
            AppError::InvalidOutput(format!(
                "{} returned output not matching '{}': {}",
                spec.name, schema.name, e
            ))
        })
    }

    /// Run a plain-text agent
    pub async fn run_text(&self, spec: &AgentSpec, input: &str) -> Result<String> {
        let client = self.factory.create_for_model(&spec.model)?;
        tracing::debug!(agent = %spec.name, model = client.model_name(), "Running agent");
        client.generate_with_system(&spec.instructions, input).await
    }

    /// Run a plain-text agent, streaming its output
    pub async fn run_streamed(&self, spec: &AgentSpec, input: &str) -> Result<TextStream> {
        let client = self.factory.create_for_model(&spec.model)?;
        tracing::debug!(agent = %spec.name, model = client.model_name(), "Streaming agent");
        client.stream_with_system(&spec.instructions, input).await
    }
}
