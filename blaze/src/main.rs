//! Blaze - Entry Point
//!
//! Receives "package published" webhooks and redeploys the Portainer stacks
//! whose opted-in services run the published image.

use std::env;

use blaze::app::options::AppOptions;
use blaze::app::run::run;
use blaze::logs::{init_logging, LogOptions};
use blaze::settings::Settings;
use blaze::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    let version = version_info();
    if env::args().skip(1).any(|arg| arg == "--version" || arg == "-V") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{}", version.version),
        }
        return;
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to load settings: {e}");
            std::process::exit(1);
        }
    };

    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        json_format: settings.log_json,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let options = AppOptions::from(&settings);
    info!(
        "Running Blaze {} ({}) with options: {:?}",
        version.version, version.git_hash, options
    );

    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Failed to run Blaze: {e}");
        std::process::exit(1);
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Ctrl+C received, shutting down...");
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("received shutdown signal (SIGTERM), exiting");
            }
            _ = sigint.recv() => {
                info!("received shutdown signal (SIGINT), exiting");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
        }
        info!("Ctrl+C received, shutting down...");
    }
}
