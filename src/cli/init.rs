//! Init command implementation
//!
//! Writes a starter `research.toml` and `.env.example`.

use super::ProviderChoice;
use super::output::{Output, Status};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// research.toml already exists and --force was not given
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider to configure
    pub provider: ProviderChoice,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.heading("Initializing Deep Research");

    let base_path = &config.path;
    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.status(Status::Fail, &format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    let config_path = base_path.join("research.toml");
    if config_path.exists() && !config.force {
        output.status(Status::Warn, "research.toml already exists");
        output.status(Status::Tip, "Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheading("Creating configuration files");

    let files = [
        ("config", "research.toml", generate_research_toml(config.provider)),
        ("env", ".env.example", generate_env_example().to_string()),
    ];
    for (kind, name, content) in &files {
        match write_file(&base_path.join(name), content, config.force) {
            Ok(true) => output.status(Status::Created, &format!("{} ({})", name, kind)),
            Ok(false) => output.status(Status::Skipped, &format!("{} (already exists)", name)),
            Err(e) => {
                output.status(Status::Fail, &format!("Failed to create {}: {}", name, e));
                return InitResult::Error(e.to_string());
            }
        }
    }

    output.status(Status::Done, "Deep Research initialized");

    output.heading("Next steps");
    match config.provider {
        ProviderChoice::Openai => {
            output.status(Status::Note, "1. Put your OpenAI key in .env:");
            output.command("cp .env.example .env");
            output.command("# Edit .env and set OPENAI_API_KEY");
        }
        ProviderChoice::Ollama => {
            output.status(Status::Note, "1. Start Ollama and pull a model:");
            output.command("ollama serve");
            output.command("ollama pull llama3.2");
        }
    }
    output.status(Status::Note, "2. Start the wizard:");
    output.command("deep-research");

    InitResult::Success
}

/// Returns whether the file was written
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_research_toml(provider: ProviderChoice) -> String {
    let (provider_section, model_section) = match provider {
        ProviderChoice::Openai => (
            r#"# OpenAI API (set OPENAI_API_KEY in .env)
[providers.openai]
type = "openai"
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"
default_model = "gpt-4o-mini"
"#,
            r#"[models.default]
provider = "openai"
model = "gpt-4o-mini"
temperature = 0.7
"#,
        ),
        ProviderChoice::Ollama => (
            r#"# Ollama - local inference, no API key required
[providers.ollama-local]
type = "ollama"
base_url = "http://localhost:11434"
default_model = "llama3.2"
"#,
            r#"[models.default]
provider = "ollama-local"
model = "llama3.2"
temperature = 0.7
"#,
        ),
    };

    format!(
        r#"# Deep Research Configuration
# Generated by: deep-research init
#
# Changes to this file are picked up while the server runs.

[server]
host = "127.0.0.1"
port = 7860
log_level = "info"
open_browser = true
session_ttl_secs = 3600
max_body_bytes = 65536

# =============================================================================
# Providers
# =============================================================================
{provider_section}
# =============================================================================
# Models (referenced by agents)
# =============================================================================
{model_section}
# =============================================================================
# Agents
# =============================================================================
# Each agent names a model above. Add `instructions = "..."` to replace the
# built-in instructions.

[agents.questions]
model = "default"

[agents.planner]
model = "default"

[agents.search]
model = "default"

[agents.writer]
model = "default"

# =============================================================================
# Research pipeline
# =============================================================================
[research]
how_many_searches = 5
max_concurrent_searches = 4
results_per_search = 5
search_timeout_secs = 30
"#
    )
}

fn generate_env_example() -> &'static str {
    r#"# Deep Research Environment Variables
# Copy this file to .env and fill in the values.
# Values in .env override variables already set in the environment.

# OpenAI API key (used by providers with type = "openai")
OPENAI_API_KEY=sk-...

# Optional: logging filter (trace, debug, info, warn, error)
# RUST_LOG=info,deep_research=debug
"#
}
