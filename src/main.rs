mod audio;
mod config;
mod detector;
mod error;
mod events;
mod monitor;

use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info, warn};

use crate::audio::probe::SinkProber;
use crate::events::publisher::EventPublisher;
use crate::monitor::Monitor;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let publisher = match EventPublisher::new(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Audio State Monitor started");
    info!(
        "Monitoring: {} (every {}s, events -> {})",
        config.device,
        config.scan_interval_secs,
        publisher.endpoint(),
    );
    if config.token.is_none() {
        warn!("No supervisor token found, events will not be sent");
    }

    // Register both handlers before the first cycle so an early signal is not lost.
    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(int), Ok(term)) => (int, term),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to register signal handlers: {}", e);
            std::process::exit(1);
        }
    };
    let shutdown = async move {
        tokio::select! {
            _ = sigint.recv() => info!("Received SIGINT"),
            _ = sigterm.recv() => info!("Received SIGTERM"),
        }
    };

    let prober = SinkProber::new(&config.device, &config.pactl_path);
    Monitor::new(prober, publisher, config.scan_interval())
        .run(shutdown)
        .await;

    info!("Audio State Monitor stopped");
}
