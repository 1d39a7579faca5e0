use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dirmail_service::{ServiceConfig, WatchService, logging};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// E-mail every new file created in a watched directory.
#[derive(Debug, Parser)]
#[command(name = "dirmail", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "DIRMAIL_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ServiceConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let _log_guard = logging::init(&config.logging)?;

    if cli.check {
        config.validate().context("configuration check failed")?;
        info!("Configuration {} is valid", cli.config.display());
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let force = CancellationToken::new();

    let mut service = WatchService::new(&config);
    service
        .start(&shutdown)
        .await
        .context("DirectoryWatcher service failed to start")?;

    tokio::spawn({
        let shutdown = shutdown.clone();
        let force = force.clone();
        async move {
            wait_for_signal().await;
            shutdown.cancel();
            // A second signal abandons the graceful stop.
            wait_for_signal().await;
            force.cancel();
        }
    });

    service.run(&shutdown).await;
    service.stop(&force).await;

    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("SIGTERM handler unavailable: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
