use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use streamflow::StreamflowConfig;
use streamflow::config::DEFAULT_CONFIG_PATH;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "windviz")]
#[command(about = "Trace Euler and RK4 streamlines through a sampled wind field")]
struct Args {
    /// Config file. Without it `windviz.toml` is read, or the built-in defaults when missing
    config: Option<PathBuf>,

    /// Write the default config to PATH (default `windviz.toml`) and exit
    #[arg(long, value_name = "PATH", conflicts_with = "config")]
    init: Option<Option<PathBuf>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(path) = args.init {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        StreamflowConfig::default()
            .save_to_file(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = match args.config {
        Some(path) => StreamflowConfig::load_from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StreamflowConfig::load_or_default(DEFAULT_CONFIG_PATH)?,
    };

    let report = windviz::run(&config)?;
    windviz::write_json(&report, &config.output.path, config.output.pretty)?;

    Ok(())
}
