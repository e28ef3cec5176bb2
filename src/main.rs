//! StashBot - Slack link-stashing assistant
//!
//! Mentions are classified as link-save requests or conversational
//! queries; links land in Notion, queries go to a local LLM with per-user
//! conversation memory.

use anyhow::Result;
use clap::{Parser, Subcommand};
use stashbot::channels::{run_socket_mode, SlackClient};
use stashbot::config::StashbotConfig;
use stashbot::engine::Engine;
use stashbot::extract::WebExtractor;
use stashbot::history::ConversationStore;
use stashbot::labels::LabelStore;
use stashbot::llm::OllamaClient;
use stashbot::notion::NotionClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stashbot")]
#[command(version)]
#[command(about = "Slack assistant that stashes links into Notion and chats through a local LLM")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STASHBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first, so both clap env args and config overrides see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("stashbot={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        StashbotConfig::from_file(config_path)?
    } else {
        StashbotConfig::default()
    };
    config.apply_env();

    match cli.command {
        Commands::Run => run(config).await?,
        Commands::Config { default } => {
            let shown = if default {
                StashbotConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

async fn run(config: StashbotConfig) -> Result<()> {
    config.validate()?;

    tracing::info!("Starting StashBot");

    // Stores and collaborators, wired once and shared by every pipeline run
    let labels = Arc::new(LabelStore::load(&config.labels.file).await?);
    let history = Arc::new(ConversationStore::new(
        config.history.persona.clone(),
        config.history.max_turns,
    ));
    let model = Arc::new(OllamaClient::new(&config.model));
    let extractor = Arc::new(WebExtractor::new());
    let notion = Arc::new(NotionClient::connect(&config.notion).await?);

    let engine = Arc::new(Engine::new(
        model,
        extractor,
        notion,
        labels,
        history,
        config.labels.max_suggestions,
    ));

    // One-shot startup step: resolve the bot's own identity
    let slack = Arc::new(SlackClient::new(&config.slack));
    let identity = slack.auth_test().await?;

    tracing::info!("StashBot is running. Press Ctrl+C to stop.");

    tokio::select! {
        result = run_socket_mode(slack, engine, identity) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
        }
    }

    Ok(())
}
