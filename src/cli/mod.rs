//! CLI module for Deep Research
//!
//! Provides command-line interface parsing for the deep-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Deep Research - clarifying-questions research wizard
///
/// Opens a local web page that takes a topic, asks three clarifying
/// questions and streams a markdown research report.
#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    version,
    about = "Deep Research - topic in, clarifying questions, streamed report out",
    long_about = "Deep Research runs a local web wizard: enter a research topic, answer three generated\n\
                  clarifying questions, and read the markdown report as it streams in.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a config.",
    after_help = "EXAMPLES:\n    \
                  deep-research init                 # Write research.toml and .env.example\n    \
                  deep-research                      # Start the server and open the browser\n    \
                  deep-research --port 8080          # Use another port\n    \
                  deep-research config --validate    # Check research.toml"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "research.toml", global = true)]
    pub config: PathBuf,

    /// Host address to bind (overrides server.host)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Do not open the browser on startup
    #[arg(long, global = true)]
    pub no_browser: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    Serve,

    /// Write a starter research.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure
        #[arg(long, value_enum, default_value_t = ProviderChoice::Openai)]
        provider: ProviderChoice,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file and report warnings
        #[arg(long)]
        validate: bool,
    },
}

/// Provider written by `init`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderChoice {
    Openai,
    Ollama,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
