mod ask_cmd;
mod chat_cmd;
mod config_cmd;
mod models_cmd;
mod preview_cmd;
mod runtime;
mod terminal_output;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use triage_config::load_and_prepare;
use triage_core::ModelId;
use triage_logging::{init_logger, LogOutput};

use terminal_output::note_error;

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Triage: ask an SRE assistant about your incident logs")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./triage.yaml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Incident CSV file
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat
    Chat {
        /// Model to start with
        #[arg(short, long)]
        model: Option<ModelId>,
    },
    /// Ask one question and stream the answer to stdout
    Ask {
        prompt: String,
        #[arg(short, long)]
        model: Option<ModelId>,
    },
    /// Print the incident table as loaded
    Preview,
    /// List the selectable models
    Models,
    /// Show the effective configuration with secrets masked
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_and_prepare(cli.config.as_deref()).await?;
    let mut config = loaded.config;
    if let Some(data) = cli.data {
        config.dataset.path = data;
    }

    // The chat screen owns the terminal, so it only logs to file.
    let output = LogOutput {
        console: !matches!(cli.command, Commands::Chat { .. }),
        dir: config.logging.dir.clone(),
    };
    init_logger(&config.logging.level, &output);

    info!(
        source = ?loaded.source,
        data = %config.dataset.path.display(),
        "Configuration loaded"
    );
    for warning in &loaded.report.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    if !loaded.report.is_valid() {
        for error in &loaded.report.errors {
            note_error(&error.to_string());
        }
        bail!("invalid configuration");
    }

    match cli.command {
        Commands::Chat { model } => {
            let model = model.unwrap_or(config.provider.default_model);
            chat_cmd::run(&config, model).await
        }
        Commands::Ask { prompt, model } => {
            let model = model.unwrap_or(config.provider.default_model);
            ask_cmd::run(&config, model, &prompt).await
        }
        Commands::Preview => preview_cmd::run(&config),
        Commands::Models => models_cmd::run(&config),
        Commands::Config => config_cmd::run(&config, loaded.source.as_deref()),
    }
}
