mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audio_mirror_core::{
    load_config, validate_config, Converter, FfmpegConverter, LocalFs, TreeConverter,
};

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config_path = cli.config_path(&cwd);

    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No configuration file, using defaults and environment"),
    }
    let mut config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    cli.apply_overrides(&mut config);

    validate_config(&config).context("Configuration validation failed")?;

    info!("Input directory: {:?}", config.input_dir);
    info!("Output directory: {:?}", config.output_dir);
    info!("Audio format: {}", config.format);

    let converter = FfmpegConverter::new(config.converter.clone());
    converter
        .validate()
        .await
        .context("FFmpeg is not available")?;
    info!("Using ffmpeg at {:?}", config.converter.ffmpeg_path);

    let tree = TreeConverter::new(converter, LocalFs, config.format);
    let summary = tree
        .run(&config.input_dir, &config.output_dir)
        .await
        .context("Tree conversion aborted")?;

    info!(
        "Done: {} files visited, {} converted",
        summary.files(),
        summary.converted
    );

    Ok(())
}
