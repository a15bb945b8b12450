//! `parley` entry point.

use anyhow::Context;
use clap::Parser;
use log::{debug, error, info};
use parley_rs::bot;
use parley_rs::config::{LayeredConfigOptions, ParleyConfig};
use std::path::PathBuf;

/// Command-line options for the bot.
#[derive(Parser)]
#[command(name = "parley", version)]
struct Cli {
    /// Extra parley.json5 layers, applied after the default layers in order
    #[arg(long = "config")]
    config: Vec<PathBuf>,
    /// Workspace root for file commands and the default memory location
    #[arg(long)]
    workspace: Option<PathBuf>,
    /// Load and validate the configuration, then exit
    #[arg(long)]
    check: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<ParleyConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    info!("loading layered config from cwd: {}", cwd.display());
    let options = cli
        .config
        .iter()
        .fold(LayeredConfigOptions::new(&cwd), |options, path| {
            options.with_runtime_path(path)
        });
    let layered = ParleyConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());

    let mut config = layered.config.with_env_overrides();
    if let Some(workspace) = cli.workspace.as_ref() {
        config.workspace.root = workspace.display().to_string();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    if cli.check {
        config.credentials()?;
        info!("configuration ok");
        return Ok(());
    }

    tokio::select! {
        result = bot::run(config) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted; shutting down");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    let cli = Cli::parse();
    info!(
        "starting parley (config_layers={}, workspace_set={}, check={})",
        cli.config.len(),
        cli.workspace.is_some(),
        cli.check
    );
    let outcome = run(cli).await;
    if let Err(err) = &outcome {
        error!("parley stopped: {:#}", err);
    }
    outcome
}
