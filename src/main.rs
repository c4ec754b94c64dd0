use bootlink::config::ConfigLoader;
use bootlink::controller::Controller;
use bootlink::error::LinkResult;
use bootlink::logging;
use bootlink::port::SystemPorts;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Watches a serial-attached board: validates its boot banner and toggles it on and off, reconnecting on failure.",
    long_about = "Runs until interrupted. With no arguments the built-in defaults apply: 9600 baud, Arduino/CH340/ttyUSB discovery, the four-line BOOT INFO banner and an LED ON (5 s) / LED OFF (10 s) cadence."
)]
struct Args {
    /// TOML file overriding the built-in defaults.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level or filter directive (e.g. "debug"). RUST_LOG takes precedence.
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> LinkResult<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::load(args.config.as_deref())?.into_config();
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    logging::init(&config.logging)?;

    info!("Looking for board. Press Ctrl+C to exit.");
    let mut controller = Controller::new(&config, SystemPorts);

    tokio::select! {
        _ = controller.run() => {},
        _ = shutdown_signal() => {},
    }

    controller.shutdown();
    info!(stats = ?controller.stats(), "Stopped");
    Ok(())
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Signal received, shutting down...");
}
