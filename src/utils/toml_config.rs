//! TOML-based configuration for Deep Research
//!
//! This module provides declarative configuration for the server, LLM
//! providers, models, the four research agents and the research pipeline via
//! a TOML file (`research.toml`).
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Agent instructions and research limits are read per request, so edits take
//! effect on the next generation without a restart. Use `ConfigManager` for
//! thread-safe access to the current configuration.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from research.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Named LLM provider configurations
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,

    /// Named model configurations that reference providers
    #[serde(default = "default_models")]
    pub models: HashMap<String, ModelConfig>,

    /// The agents taking part in a research run
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Research pipeline limits
    #[serde(default)]
    pub research: PipelineConfig,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: default_providers(),
            models: default_models(),
            agents: AgentsConfig::default(),
            research: PipelineConfig::default(),
        }
    }
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Open the UI in the default browser once the server is listening
    #[serde(default = "default_true")]
    pub open_browser: bool,

    /// Idle sessions older than this are dropped
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            open_browser: default_true(),
            session_ttl_secs: default_session_ttl(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        default_model: String,
    },
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        default_model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "default";
pub const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";

fn default_providers() -> HashMap<String, ProviderConfig> {
    HashMap::from([(
        DEFAULT_PROVIDER.to_string(),
        ProviderConfig::OpenAI {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            default_model: DEFAULT_MODEL_ID.to_string(),
        },
    )])
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    /// Model name/identifier to use with the provider
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens; provider default when unset
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_models() -> HashMap<String, ModelConfig> {
    HashMap::from([(
        DEFAULT_MODEL.to_string(),
        ModelConfig {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL_ID.to_string(),
            temperature: default_temperature(),
            max_tokens: None,
        },
    )])
}

// ============= Agent Configuration =============

/// The fixed cast of agents used by the wizard and the research manager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Generates the three clarifying questions
    #[serde(default)]
    pub questions: AgentConfig,

    /// Turns the enriched query into a list of web searches
    #[serde(default)]
    pub planner: AgentConfig,

    /// Summarizes the results of one web search
    #[serde(default)]
    pub search: AgentConfig,

    /// Writes the final markdown report
    #[serde(default)]
    pub writer: AgentConfig,
}

impl AgentsConfig {
    /// Iterate over (agent name, config) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AgentConfig)> {
        [
            ("questions", &self.questions),
            ("planner", &self.planner),
            ("search", &self.search),
            ("writer", &self.writer),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Reference to a model name defined in [models]
    #[serde(default = "default_agent_model")]
    pub model: String,

    /// Replaces the built-in instructions for this agent
    #[serde(default)]
    pub instructions: Option<String>,
}

fn default_agent_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_agent_model(),
            instructions: None,
        }
    }
}

// ============= Research Pipeline Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of web searches the planner is asked for
    #[serde(default = "default_how_many_searches")]
    pub how_many_searches: usize,

    #[serde(default = "default_max_concurrent_searches")]
    pub max_concurrent_searches: usize,

    #[serde(default = "default_results_per_search")]
    pub results_per_search: usize,

    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,
}

fn default_how_many_searches() -> usize {
    5
}

fn default_max_concurrent_searches() -> usize {
    4
}

fn default_results_per_search() -> usize {
    5
}

fn default_search_timeout() -> u64 {
    30
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            how_many_searches: default_how_many_searches(),
            max_concurrent_searches: default_max_concurrent_searches(),
            results_per_search: default_results_per_search(),
            search_timeout_secs: default_search_timeout(),
        }
    }
}

// ============= Errors and Warnings =============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Provider '{0}' referenced by model '{1}' does not exist")]
    MissingProvider(String, String),

    #[error("Model '{0}' referenced by agent '{1}' does not exist")]
    MissingModel(String, String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

/// Non-fatal findings reported by `validate_with_warnings`
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    UnusedProvider(String),
    UnusedModel(String),
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::UnusedProvider(name) => {
                write!(f, "Provider '{}' is not referenced by any model", name)
            }
            ConfigWarning::UnusedModel(name) => {
                write!(f, "Model '{}' is not referenced by any agent", name)
            }
        }
    }
}

impl ResearchConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Load the file if present, otherwise fall back to the built-in defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::FileNotFound(missing)) => {
                warn!(
                    "No configuration at {:?}; using built-in defaults (OpenAI, {})",
                    missing, DEFAULT_MODEL_ID
                );
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Log level declared in the file at `path`, read before tracing is up
    ///
    /// Falls back to the default level when the file is missing or broken;
    /// the real load reports those errors once logging works.
    pub fn peek_log_level<P: AsRef<Path>>(path: P) -> String {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str::<ResearchConfig>(&content).ok())
            .map(|config| config.server.log_level)
            .unwrap_or_else(default_log_level)
    }

    /// Parse without validation
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, provider) in &self.providers {
            match provider {
                ProviderConfig::OpenAI { api_key_env, .. } => {
                    self.validate_env_var(api_key_env)?;
                }
                ProviderConfig::Ollama { base_url, .. } => {
                    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                        return Err(ConfigError::ValidationError(format!(
                            "Ollama base_url must be an http(s) URL: {} (provider: {})",
                            base_url, name
                        )));
                    }
                }
            }
        }

        // Validate model -> provider references
        for (model_name, model_config) in &self.models {
            if !self.providers.contains_key(&model_config.provider) {
                return Err(ConfigError::MissingProvider(
                    model_config.provider.clone(),
                    model_name.clone(),
                ));
            }
        }

        // Validate agent -> model references
        for (agent_name, agent_config) in self.agents.iter() {
            if !self.models.contains_key(&agent_config.model) {
                return Err(ConfigError::MissingModel(
                    agent_config.model.clone(),
                    agent_name.to_string(),
                ));
            }
        }

        if self.research.how_many_searches == 0 {
            return Err(ConfigError::ValidationError(
                "research.how_many_searches must be at least 1".to_string(),
            ));
        }
        if self.research.max_concurrent_searches == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_concurrent_searches must be at least 1".to_string(),
            ));
        }
        if self.research.search_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "research.search_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        match self.resolve_env(name) {
            Some(value) if !value.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingEnvVar(name.to_string())),
        }
    }

    /// Validate configuration with warnings for unused items
    ///
    /// Returns Ok with warnings, or Err if validation fails
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(self.check_unused_providers());
        warnings.extend(self.check_unused_models());
        Ok(warnings)
    }

    /// Check for providers that aren't referenced by any model
    fn check_unused_providers(&self) -> Vec<ConfigWarning> {
        let mut unused: Vec<ConfigWarning> = self
            .providers
            .keys()
            .filter(|name| !self.models.values().any(|m| &m.provider == *name))
            .map(|name| ConfigWarning::UnusedProvider(name.clone()))
            .collect();
        unused.sort_by_key(|w| w.to_string());
        unused
    }

    /// Check for models that aren't referenced by any agent
    fn check_unused_models(&self) -> Vec<ConfigWarning> {
        let mut unused: Vec<ConfigWarning> = self
            .models
            .keys()
            .filter(|name| !self.agents.iter().any(|(_, a)| &a.model == *name))
            .map(|name| ConfigWarning::UnusedModel(name.clone()))
            .collect();
        unused.sort_by_key(|w| w.to_string());
        unused
    }

    /// Resolve an environment variable by name
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get provider by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Get model by name
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Load `path` and publish it to readers of `target`
///
/// `target` keeps the previous config when the file fails to load.
fn reload_into(path: &Path, target: &ArcSwap<ResearchConfig>) -> Result<(), ConfigError> {
    let new_config = ResearchConfig::load(path)?;
    target.store(Arc::new(new_config));
    Ok(())
}

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<ResearchConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    ///
    /// A missing file falls back to the built-in defaults; a present but
    /// invalid file is an error.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Convert to absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = ResearchConfig::load_or_default(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: ResearchConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("test-config.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<ResearchConfig> {
        self.config.load_full()
    }

    /// Path the configuration was loaded from
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        // Debounced in the receiver
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload = std::time::Instant::now();
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.elapsed() < debounce_duration {
                    continue;
                }

                // Wait a bit for file write to complete
                tokio::time::sleep(Duration::from_millis(100)).await;

                match reload_into(&config_path, &config_arc) {
                    Ok(()) => {
                        info!("Configuration hot-reloaded successfully");
                        last_reload = std::time::Instant::now();
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}
