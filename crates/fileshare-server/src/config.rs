//! Server runtime configuration.

use std::path::PathBuf;

/// Configuration for one server instance.
///
/// Built from CLI arguments in `main.rs`; kept as a standalone struct so
/// tests can construct it directly without going through `clap`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the TCP listener to.
    pub bind_address: String,
    /// Path to the SQLite metadata database file.
    pub db_path: PathBuf,
    /// Root directory of the sharded blob store.
    pub storage_path: PathBuf,
    /// Path to the line-oriented `server.log` file.
    pub log_path: PathBuf,
    /// Maximum number of simultaneous connections.
    pub max_connections: usize,
    /// `tracing` log level filter, e.g. `"info"`.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4455".to_string(),
            db_path: PathBuf::from("fileshare.db"),
            storage_path: PathBuf::from("storage"),
            log_path: PathBuf::from("server.log"),
            max_connections: 100,
            log_level: "info".to_string(),
        }
    }
}
