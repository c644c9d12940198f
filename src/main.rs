use anyhow::Context;
use deep_research::{
    AgentRunner, AppState, ConfigManager, DaedraSearch, ProviderRegistry, ResearchConfig,
    ResearchManager, build_app,
    cli::{
        Cli, Commands,
        init::{self, InitConfig, InitResult},
        output::{Output, Status},
    },
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env values win over the inherited environment
    let _ = dotenvy::dotenv_override();

    let cli = Cli::parse_args();
    let output = Output::new(!cli.no_color);

    match cli.command {
        Some(Commands::Init {
            ref path,
            force,
            provider,
        }) => {
            let result = init::run(
                InitConfig {
                    path: path.clone(),
                    force,
                    provider,
                },
                &output,
            );
            match result {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => Err(anyhow::anyhow!(e)),
            }
        }
        Some(Commands::Config { validate }) => show_config(&cli, validate, &output),
        Some(Commands::Serve) | None => serve(cli, output).await,
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn show_config(cli: &Cli, validate: bool, output: &Output) -> anyhow::Result<()> {
    output.heading("Configuration");

    let config = if cli.config.exists() {
        output.field("File", &cli.config.display().to_string());
        let content = std::fs::read_to_string(&cli.config)
            .with_context(|| format!("reading {}", cli.config.display()))?;
        ResearchConfig::from_toml_str(&content)?
    } else {
        output.field("File", "(not found, using built-in defaults)");
        ResearchConfig::default()
    };

    output.field("Listen", &config.bind_address());
    output.field("Log level", &config.server.log_level);
    output.field("Session TTL", &format!("{}s", config.server.session_ttl_secs));

    output.subheading("Models");
    let mut models: Vec<_> = config.models.iter().collect();
    models.sort_by_key(|(name, _)| *name);
    for (name, model) in models {
        output.bullet(&format!(
            "{} -> {} ({}, temperature {})",
            name, model.model, model.provider, model.temperature
        ));
    }

    output.subheading("Agents");
    for (name, agent) in config.agents.iter() {
        let instructions = if agent.instructions.is_some() {
            "custom instructions"
        } else {
            "built-in instructions"
        };
        output.bullet(&format!("{} -> {} ({})", name, agent.model, instructions));
    }

    output.subheading("Research");
    output.field("Searches", &config.research.how_many_searches.to_string());
    output.field(
        "Concurrency",
        &config.research.max_concurrent_searches.to_string(),
    );
    output.field(
        "Results per search",
        &config.research.results_per_search.to_string(),
    );
    output.field(
        "Search timeout",
        &format!("{}s", config.research.search_timeout_secs),
    );

    if validate {
        output.subheading("Validation");
        match config.validate_with_warnings() {
            Ok(warnings) => {
                for warning in &warnings {
                    output.status(Status::Warn, &warning.to_string());
                }
                output.status(Status::Ok, "Configuration is valid");
            }
            Err(e) => {
                output.status(Status::Fail, &e.to_string());
                return Err(e.into());
            }
        }
    }

    Ok(())
}

async fn serve(cli: Cli, output: Output) -> anyhow::Result<()> {
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        ResearchConfig::peek_log_level(&cli.config)
    };
    init_tracing(&level)?;

    let config_manager = Arc::new(
        ConfigManager::new(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?,
    );
    let config = config_manager.config();

    output.banner();

    if cli.config.exists() {
        if let Err(e) = config_manager.start_watching() {
            tracing::warn!("Config hot-reload disabled: {}", e);
        }
    }

    let registry = Arc::new(ProviderRegistry::new(config_manager.clone()));
    let manager = ResearchManager::new(
        AgentRunner::new(registry),
        Arc::new(DaedraSearch::new()),
        config_manager.clone(),
    );
    let state = AppState::new(config_manager.clone(), Arc::new(manager));
    let app = build_app(state);

    let host = cli.host.clone().unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    let url = format!("http://{}", listener.local_addr()?);

    tracing::info!("Deep Research listening on {}", url);
    output.status(Status::Ok, &format!("Listening on {}", url));

    if config.server.open_browser && !cli.no_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser: {}", e);
            output.status(Status::Tip, &format!("Open {} in your browser", url));
        }
    }

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    config_manager.stop_watching();
    served.context("server error")?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
