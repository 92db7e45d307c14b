//! Line-framed TCP transport built on `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Longest line payload accepted from a peer, terminator excluded.
pub const MAX_LINE_LEN: usize = 512;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Length of `line` without its LF or CR LF terminator.
fn payload_len(line: &[u8]) -> usize {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line).len()
}

/// A TCP [`Transport`] whose connections speak newline-terminated text.
pub struct TcpLineTransport {
    listener: TcpListener,
}

impl TcpLineTransport {
    /// Binds a new transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }
}

impl Transport for TcpLineTransport {
    type Connection = TcpLineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted TCP connection");

        Ok(TcpLineConnection::new(id, stream))
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A single TCP connection read one line at a time.
///
/// The read and write halves sit behind separate locks so a reply can be
/// written while another task is parked on `recv`.
pub struct TcpLineConnection {
    id: ConnectionId,
    peer: Option<SocketAddr>,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpLineConnection {
    fn new(id: ConnectionId, stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        let (read, write) = stream.into_split();
        Self {
            id,
            peer,
            reader: Mutex::new(BufReader::new(read)),
            writer: Mutex::new(write),
        }
    }

    /// Returns the remote address, if the OS still reports it.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl Connection for TcpLineConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        // Payload plus CR LF.
        let limit = (MAX_LINE_LEN + 2) as u64;

        let mut reader = self.reader.lock().await;
        let mut line = Vec::new();
        let n = (&mut *reader)
            .take(limit)
            .read_until(b'\n', &mut line)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if n == 0 {
            return Ok(None);
        }
        if payload_len(&line) > MAX_LINE_LEN {
            return Err(TransportError::LineTooLong(MAX_LINE_LEN));
        }
        // An unterminated tail before EOF still counts as a line.
        Ok(Some(line))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
