//! relayd: scoped execution relay daemon
//!
//! Serves the relay over HTTP and derives operation selectors from
//! signatures.

use clap::{Parser, Subcommand};
use relay_daemon::config::DaemonConfig;
use relay_daemon::error::{DaemonError, DaemonResult};
use relay_daemon::server::Server;
use relay_types::Selector;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// relayd CLI
#[derive(Parser)]
#[command(name = "relayd")]
#[command(about = "Scoped execution relay daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<String>,

    /// Listen address, overriding the configuration
    #[arg(short, long, env = "RELAY_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level, overriding the configuration
    #[arg(long, env = "RELAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "RELAY_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Print the selector of each function signature
    Selector {
        /// Signatures such as `transfer(address,uint256)`
        #[arg(required = true)]
        signatures: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    if let Some(Command::Selector { signatures }) = &cli.command {
        for signature in signatures {
            println!("{}  {}", Selector::from_signature(signature), signature);
        }
        return Ok(());
    }

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    let json = cli.json || config.logging.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        "starting relayd"
    );

    let server = Server::new(config)?;
    server.run().await
}
