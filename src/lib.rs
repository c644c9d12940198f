//! # Deep Research
//!
//! A clarifying-questions research wizard. The user enters a topic, an LLM
//! agent generates three clarifying questions, the user answers them, and a
//! research pipeline streams back a markdown report built from web searches.
//!
//! ## Overview
//!
//! Deep Research can be used in two ways:
//!
//! 1. **As a standalone app** - Run the `deep-research` binary, which serves a
//!    local web page and opens it in the browser
//! 2. **As a library** - Drive the wizard or the research pipeline directly
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use deep_research::{
//!     AgentRunner, ConfigManager, DaedraSearch, ProviderRegistry, ResearchManager,
//!     ResearchPipeline, enrich_query,
//! };
//! use std::sync::Arc;
//!
//! let config = Arc::new(ConfigManager::new("research.toml")?);
//! let runner = AgentRunner::new(Arc::new(ProviderRegistry::new(config.clone())));
//! let manager = ResearchManager::new(runner, Arc::new(DaedraSearch::new()), config);
//!
//! let topic = "Impact of remote work on urban housing";
//! let questions = manager.generate_questions(topic).await?;
//! let answers = ["US metros".into(), "2019-2024".into(), "Both".into()];
//!
//! let mut report = manager.run_full(enrich_query(topic, &questions, &answers));
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - Declarative agents and their output schemas
//! - [`api`] - HTTP handlers, routes and the embedded page
//! - [`llm`] - LLM client implementations (OpenAI, Ollama)
//! - [`research`] - Query enrichment and the research manager
//! - [`tools`] - Web search
//! - [`wizard`] - Per-session state machine
//! - [`types`] - Common types and error handling
//!
//! ## Configuration
//!
//! `research.toml` declares providers, models, agents and pipeline limits.
//! It is hot-reloaded; a missing file falls back to OpenAI `gpt-4o-mini`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Declarative research agents.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Query enrichment and the research pipeline.
pub mod research;
/// Built-in tools (web search).
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;
/// Clarifying-questions wizard sessions.
pub mod wizard;

// Re-export commonly used types
pub use agents::{AgentKind, AgentRunner, AgentSpec, QuestionSet};
pub use api::routes::build_app;
pub use llm::{LLMClient, LLMClientFactory, Provider, ProviderRegistry};
pub use research::{ResearchManager, ResearchPipeline, ResearchUpdate, enrich_query};
pub use tools::{DaedraSearch, WebSearch};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, ResearchConfig};
pub use wizard::{WizardService, WizardState, WizardView};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Session state machines and the research pipeline behind them
    pub wizard: WizardService,
}

impl AppState {
    /// Wire the wizard to a research pipeline
    pub fn new(config_manager: Arc<ConfigManager>, pipeline: Arc<dyn ResearchPipeline>) -> Self {
        Self {
            wizard: WizardService::new(pipeline, config_manager.clone()),
            config_manager,
        }
    }
}
