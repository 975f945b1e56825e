//! A thin, synchronous-per-call client over one TCP connection.
//!
//! Exists to drive the wire protocol end-to-end in the server's integration
//! tests; it is not a general-purpose SDK.

use fileshare_proto::{Frame, FrameHeader, Opcode, payloads::ErrorResponse};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use crate::error::ClientError;

/// One connection to a fileshare server.
pub struct Client {
    socket: TcpStream,
}

impl Client {
    /// Connect to a server listening at `addr`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Io`] if the connection cannot be established.
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let socket = TcpStream::connect(addr).await?;
        Ok(Self { socket })
    }

    /// Send a JSON-bodied request and decode the JSON-bodied reply.
    ///
    /// # Errors
    ///
    /// [`ClientError::Server`] if the server replies with an error frame;
    /// otherwise any I/O, protocol, or payload decoding failure.
    pub async fn call<Req: Serialize, Resp: DeserializeOwned>(
        &mut self,
        opcode: Opcode,
        request: &Req,
    ) -> Result<Resp, ClientError> {
        let payload = serde_json::to_vec(request)?;
        let frame = self.roundtrip(opcode, payload).await?;
        self.into_response(frame)
    }

    /// Send a raw binary frame (`upload-data`) and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn send_bytes<Resp: DeserializeOwned>(
        &mut self,
        opcode: Opcode,
        data: Vec<u8>,
    ) -> Result<Resp, ClientError> {
        let frame = self.roundtrip(opcode, data).await?;
        self.into_response(frame)
    }

    /// Send a request and return the raw reply frame, for commands whose
    /// reply is binary (`download-request`).
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`], except a successful binary reply is
    /// returned as-is rather than JSON-decoded.
    pub async fn download(&mut self, request: &fileshare_proto::payloads::DownloadRequest) -> Result<Vec<u8>, ClientError> {
        let payload = serde_json::to_vec(request)?;
        let frame = self.roundtrip(Opcode::DownloadRequest, payload).await?;
        if frame.command == Opcode::Error.to_u8() {
            let err: ErrorResponse = serde_json::from_slice(&frame.payload)?;
            return Err(ClientError::Server { kind: err.kind, message: err.message });
        }
        Ok(frame.payload.to_vec())
    }

    fn into_response<Resp: DeserializeOwned>(&self, frame: Frame) -> Result<Resp, ClientError> {
        if frame.command == Opcode::Error.to_u8() {
            let err: ErrorResponse = serde_json::from_slice(&frame.payload)?;
            return Err(ClientError::Server { kind: err.kind, message: err.message });
        }
        Ok(serde_json::from_slice(&frame.payload)?)
    }

    async fn roundtrip(&mut self, opcode: Opcode, payload: Vec<u8>) -> Result<Frame, ClientError> {
        let frame = Frame::new(opcode.to_u8(), payload);
        let wire = frame.encode()?;
        self.socket.write_all(&wire).await?;

        let mut header_buf = [0u8; FrameHeader::SIZE];
        self.socket.read_exact(&mut header_buf).await?;
        let header = FrameHeader::from_bytes(&header_buf)?;

        let mut body = vec![0u8; header.length as usize];
        self.socket.read_exact(&mut body).await?;

        Ok(Frame::new(header.command, body))
    }
}
