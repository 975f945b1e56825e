//! Multi-user networked file-sharing server: framed TCP protocol, relational
//! metadata store, content-addressed blob store, and a permission engine,
//! all wired together by a Tokio acceptor loop.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod acceptor;
mod config;
mod dispatch;
mod error;
mod handlers;
mod registry;
mod storage;

pub use config::ServerConfig;
pub use error::ServerError;
pub use registry::ConnectionRegistry;
pub use storage::{BlobStore, MetadataStore, StorageError};

/// A not-yet-bound server instance: stores are open, but no listener exists.
pub struct Server {
    config: ServerConfig,
    store: MetadataStore,
    blobs: BlobStore,
}

/// A server bound to a TCP address, not yet accepting connections.
///
/// Splitting bind from run lets a caller (or test) discover the actual
/// listening address before the accept loop starts, which matters when
/// `bind_address` names an ephemeral port (`"127.0.0.1:0"`).
pub struct BoundServer {
    listener: tokio::net::TcpListener,
    store: MetadataStore,
    blobs: BlobStore,
    max_connections: usize,
}

impl Server {
    /// Open the metadata store and blob store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Storage`] if the database cannot be opened, or
    /// [`ServerError::Blob`] if the blob store's base directory cannot be
    /// created.
    pub fn open(config: ServerConfig) -> Result<Self, ServerError> {
        let store = MetadataStore::open(&config.db_path)?;
        let blobs = BlobStore::init(&config.storage_path)?;
        Ok(Self { config, store, blobs })
    }

    /// Bind the TCP listener at `config.bind_address`.
    ///
    /// # Errors
    ///
    /// Returns the underlying `io::Error` if the address cannot be bound.
    pub async fn bind(self) -> std::io::Result<BoundServer> {
        let listener = tokio::net::TcpListener::bind(&self.config.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "listening");
        Ok(BoundServer {
            listener,
            store: self.store,
            blobs: self.blobs,
            max_connections: self.config.max_connections,
        })
    }

    /// The metadata store, for admin tooling that needs direct access
    /// (e.g. seeding the first account before any client can connect).
    #[must_use]
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }
}

impl BoundServer {
    /// The address actually bound, useful when `bind_address` named an
    /// ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns the underlying `io::Error` if the socket's address can't be
    /// queried.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept loop until `shutdown` fires, then drain in-flight
    /// connections before returning.
    pub async fn run(self, shutdown: tokio::sync::watch::Receiver<bool>) {
        acceptor::serve(self.listener, self.store, self.blobs, self.max_connections, shutdown).await;
    }
}
