mod prompt;
mod shell;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recast_core::{load_config, validate_config, Config, Dispatcher, FormatRegistry};

use shell::Shell;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    // Logs go to stderr so they never interleave with menu text.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_effective_config()?;
    validate_config(&config).context("Configuration validation failed")?;

    let registry =
        FormatRegistry::with_defaults(config.defaults.image_quality, config.defaults.video_preset);
    let dispatcher = Dispatcher::new(registry, config.engine.clone());

    let mut shell = Shell::new(dispatcher);

    tokio::select! {
        result = shell.run() => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\n\nOperation cancelled by user.");
            Ok(0)
        }
    }
}

/// Loads `RECAST_CONFIG` when set (the file must exist), otherwise a
/// `recast.toml` in the working directory, otherwise built-in defaults.
fn load_effective_config() -> Result<Config> {
    if let Ok(path) = std::env::var("RECAST_CONFIG") {
        let path = PathBuf::from(path);
        info!("Loading configuration from {:?}", path);
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let local = PathBuf::from("recast.toml");
    if local.exists() {
        info!("Loading configuration from {:?}", local);
        return load_config(&local)
            .with_context(|| format!("Failed to load config from {:?}", local));
    }

    Ok(Config::default())
}
