//! TCP accept loop and per-connection frame pump.
//!
//! Modeled on the teacher's `handle_connection`/`handle_stream` pair (one
//! task per connection, a tight read-decode-dispatch-write loop per task)
//! but collapsed to a single task per connection: this protocol has no
//! room broadcasts or a separate outbound stream to coordinate, so there is
//! no need for the teacher's shared connection/stream maps.

use fileshare_core::Session;
use fileshare_proto::{Frame, FrameHeader, ProtocolError};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::{
    dispatch::dispatch,
    handlers::HandlerContext,
    registry::ConnectionRegistry,
    storage::{BlobStore, MetadataStore},
};

/// Accept connections on `listener` until `shutdown` resolves, admitting at
/// most as many concurrent connections as `registry` allows.
pub async fn run(
    listener: TcpListener,
    store: MetadataStore,
    blobs: BlobStore,
    registry: ConnectionRegistry,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, addr) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        tracing::error!(error = %err, "accept failed");
                        continue;
                    },
                };

                let Some(slot) = registry.try_admit() else {
                    tracing::warn!(%addr, "connection limit reached, rejecting");
                    drop(socket);
                    continue;
                };

                let store = store.clone();
                let blobs = blobs.clone();
                tokio::spawn(async move {
                    let _slot = slot;
                    if let Err(err) = handle_connection(socket, store, blobs).await {
                        tracing::debug!(%addr, error = %err, "connection ended");
                    }
                });
            }
            _ = shutdown.changed() => {
                tracing::info!("acceptor shutting down, no longer accepting new connections");
                break;
            }
        }
    }
}

async fn handle_connection(
    mut socket: TcpStream,
    store: MetadataStore,
    blobs: BlobStore,
) -> std::io::Result<()> {
    let mut session = Session::new();
    let mut header_buf = [0u8; FrameHeader::SIZE];

    loop {
        if socket.read_exact(&mut header_buf).await.is_err() {
            break;
        }

        let header = match FrameHeader::from_bytes(&header_buf) {
            Ok(header) => header,
            Err(err) => {
                tracing::warn!(error = %err, "bad frame header, closing connection");
                break;
            },
        };

        let mut payload = vec![0u8; header.length as usize];
        if socket.read_exact(&mut payload).await.is_err() {
            break;
        }

        let frame = Frame::new(header.command, payload);

        let mut ctx = HandlerContext { store: &store, blobs: &blobs, session: &mut session };
        let reply = dispatch(&mut ctx, frame).await;

        let wire = match reply.encode() {
            Ok(bytes) => bytes,
            Err(ProtocolError::PayloadTooLarge { .. }) => {
                tracing::error!("reply payload exceeded protocol maximum, closing connection");
                break;
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to encode reply");
                break;
            },
        };

        if socket.write_all(&wire).await.is_err() {
            break;
        }
    }

    session.disconnect();
    Ok(())
}

/// Run the accept loop on an already-bound `listener` until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    store: MetadataStore,
    blobs: BlobStore,
    max_connections: usize,
    shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let registry = ConnectionRegistry::new(max_connections);
    run(listener, store, blobs, registry.clone(), shutdown).await;

    tracing::info!("waiting for in-flight connections to finish");
    if !registry.drain(max_connections, std::time::Duration::from_secs(5)).await {
        tracing::warn!("shutdown deadline reached with connections still in flight");
    }
}

