//! Fileshare server binary.
//!
//! # Usage
//!
//! ```bash
//! fileshare-server --bind 0.0.0.0:4455 --db-path fileshare.db --storage-path storage
//! ```

use std::path::PathBuf;

use clap::Parser;
use fileshare_server::{Server, ServerConfig};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Fileshare protocol server
#[derive(Parser, Debug)]
#[command(name = "fileshare-server")]
#[command(about = "Multi-user networked file-sharing server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:4455")]
    bind: String,

    /// Path to the SQLite metadata database file
    #[arg(long, default_value = "fileshare.db")]
    db_path: PathBuf,

    /// Root directory of the sharded blob store
    #[arg(long, default_value = "storage")]
    storage_path: PathBuf,

    /// Path to the line-oriented log file
    #[arg(long, default_value = "server.log")]
    log_path: PathBuf,

    /// Maximum concurrent connections
    #[arg(long, default_value = "100")]
    max_connections: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let log_dir = args.log_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
    let log_file_name = args.log_path.file_name().map_or_else(|| "server.log".to_string(), |n| n.to_string_lossy().to_string());
    let file_appender = rolling::never(log_dir, log_file_name);
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(filter)
        .init();

    tracing::info!("fileshare server starting");
    tracing::info!(bind = %args.bind, "binding");

    let config = ServerConfig {
        bind_address: args.bind,
        db_path: args.db_path,
        storage_path: args.storage_path,
        log_path: args.log_path,
        max_connections: args.max_connections,
        log_level: args.log_level,
    };

    let server = Server::open(config)?.bind().await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("SIGINT received"),
            _ = terminate.recv() => tracing::info!("SIGTERM received"),
        }
        let _ = shutdown_tx.send(true);
    });

    server.run(shutdown_rx).await;

    Ok(())
}
