//! Promptdeck CLI — the main entry point.
//!
//! Commands:
//! - `show`     — List contexts/models/handlers and current selections
//! - `generate` — Produce one response for a prompt
//! - `metrics`  — Show pipeline metrics
//! - `export`   — Write engine state to a JSON file
//! - `import`   — Load engine state from a JSON file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use promptdeck_config::AppConfig;
use promptdeck_engine::Orchestrator;

mod commands;

#[derive(Parser)]
#[command(
    name = "promptdeck",
    about = "Promptdeck — swap prompt contexts and model backends without touching call sites",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the YAML config file
    #[arg(short, long, global = true, default_value = "config/promptdeck.yaml")]
    config: PathBuf,

    /// Load engine state from this file before the command and save it
    /// back after mutating commands
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List contexts, models, handlers and the current selections
    Show,

    /// Generate a single response
    Generate {
        /// The user prompt
        prompt: String,

        /// Switch context before generating
        #[arg(long)]
        context: Option<String>,

        /// Switch model before generating
        #[arg(long)]
        model: Option<String>,

        /// Switch handler before generating
        #[arg(long)]
        handler: Option<String>,

        /// Provider option as key=value (value parsed as JSON when possible)
        #[arg(short, long = "option")]
        options: Vec<String>,
    },

    /// Show pipeline metrics
    Metrics,

    /// Write engine state to a JSON file
    Export {
        /// Destination path
        path: PathBuf,
    },

    /// Load engine state from a JSON file
    Import {
        /// Source path
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)?;

    // RUST_LOG wins, then --verbose, then the configured level
    let fallback = if cli.verbose {
        "debug".to_string()
    } else {
        config.settings.log_level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_target(false)
        .init();

    let mut deck = Orchestrator::new(config);
    if let Some(state) = &cli.state {
        if state.exists() && !deck.import_state(state) {
            anyhow::bail!("failed to load state from {}", state.display());
        }
    }

    match cli.command {
        Commands::Show => commands::show(&deck),
        Commands::Generate {
            prompt,
            context,
            model,
            handler,
            options,
        } => {
            commands::generate(&mut deck, &prompt, context, model, handler, &options)?;
            if let Some(state) = &cli.state {
                deck.export_state(state)?;
            }
        }
        Commands::Metrics => commands::metrics(&deck),
        Commands::Export { path } => commands::export(&deck, &path)?,
        Commands::Import { path } => {
            commands::import(&mut deck, &path)?;
            if let Some(state) = &cli.state {
                deck.export_state(state)?;
            }
        }
    }

    Ok(())
}
