//! Per-connection handler: admission, the protocol loop, and release.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the client → on a full table, send `SERVER_FULL` and stop
//!   2. Loop: receive a line → run it through the state machine → reply
//!   3. On end of stream, transport error or shutdown → release
//!
//! Release (unregister + seat release) is tied to a drop guard, so it
//! runs on every exit path, early returns and panics included.

use std::sync::Arc;

use lobby_protocol::{ClientId, ErrorCode, Reply};
use lobby_session::Client;
use lobby_transport::Connection;
use tokio::sync::watch;

use crate::LobbyError;
use crate::machine::ProtocolMachine;
use crate::server::ServerState;

/// Drop guard that takes a client out of the registry when the handler
/// exits.
///
/// The registry lock is synchronous and short, so the release happens
/// right here in `drop` rather than on a spawned task.
struct RegistrationGuard {
    client_id: ClientId,
    state: Arc<ServerState>,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        let vacated = self.state.registry.unregister_client(self.client_id);
        tracing::debug!(
            client_id = %self.client_id,
            seats_released = vacated.len(),
            "client unregistered"
        );
    }
}

/// Why the protocol loop stopped.
#[derive(Debug, Clone, Copy)]
enum CloseReason {
    PeerClosed,
    TransportError,
    Shutdown,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Connection>(
    conn: C,
    state: Arc<ServerState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), LobbyError> {
    let conn_id = conn.id();
    let client_id = ClientId::from(conn_id);

    // --- Step 1: Admission ---
    if let Err(e) = state.registry.register_client(client_id) {
        tracing::warn!(
            %conn_id,
            max_clients = state.registry.config().max_clients,
            error = %e,
            "rejecting connection"
        );
        let reply = state.codec.encode(&Reply::error(ErrorCode::ServerFull));
        if let Err(send_err) = conn.send(&reply).await {
            tracing::debug!(%conn_id, error = %send_err, "could not send SERVER_FULL");
        }
        if let Err(close_err) = conn.close().await {
            tracing::debug!(%conn_id, error = %close_err, "close failed");
        }
        return Err(e.into());
    }
    let _guard = RegistrationGuard {
        client_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, "client registered");

    // --- Step 2: Protocol loop ---
    let mut machine =
        ProtocolMachine::new(Client::new(client_id), Arc::clone(&state.registry));

    let reason = loop {
        let received = tokio::select! {
            biased;
            _ = shutdown.changed() => break CloseReason::Shutdown,
            received = conn.recv() => received,
        };

        let raw = match received {
            Ok(Some(raw)) => raw,
            Ok(None) => break CloseReason::PeerClosed,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "receive failed");
                break CloseReason::TransportError;
            }
        };

        let replies = machine.handle_line(&raw);
        if replies.is_empty() {
            continue;
        }
        if let Err(e) = conn.send(&state.codec.encode_all(&replies)).await {
            tracing::warn!(%conn_id, error = %e, "send failed");
            break CloseReason::TransportError;
        }
    };

    // --- Step 3: Closing ---
    let client = machine.client();
    tracing::info!(
        %conn_id,
        nick = client.nickname(),
        ?reason,
        "client disconnected"
    );
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }

    // _guard drops here → client unregistered, seats released.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;

    use lobby_protocol::LineCodec;
    use lobby_registry::{Registry, RegistryConfig, RegistryError};
    use lobby_transport::{ConnectionId, TransportError};

    /// What a [`ScriptedConnection`] saw, kept after the handler drops it.
    #[derive(Default)]
    struct Record {
        pending: VecDeque<Vec<u8>>,
        sent: Vec<u8>,
        closed: bool,
    }

    /// A connection that replays fixed lines and can refuse all writes.
    struct ScriptedConnection {
        id: ConnectionId,
        fail_io: bool,
        record: Arc<Mutex<Record>>,
    }

    impl ScriptedConnection {
        fn new(id: u64, lines: &[&str], fail_io: bool) -> (Self, Arc<Mutex<Record>>) {
            let record = Arc::new(Mutex::new(Record {
                pending: lines.iter().map(|l| l.as_bytes().to_vec()).collect(),
                ..Record::default()
            }));
            let conn = Self {
                id: ConnectionId::new(id),
                fail_io,
                record: Arc::clone(&record),
            };
            (conn, record)
        }

        fn broken_pipe() -> TransportError {
            TransportError::SendFailed(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    impl Connection for ScriptedConnection {
        type Error = TransportError;

        async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
            if self.fail_io {
                return Err(Self::broken_pipe());
            }
            self.record.lock().unwrap().sent.extend_from_slice(data);
            Ok(())
        }

        async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
            Ok(self.record.lock().unwrap().pending.pop_front())
        }

        async fn close(&self) -> Result<(), Self::Error> {
            self.record.lock().unwrap().closed = true;
            if self.fail_io {
                return Err(Self::broken_pipe());
            }
            Ok(())
        }

        fn id(&self) -> ConnectionId {
            self.id
        }
    }

    fn state(max_clients: usize) -> Arc<ServerState> {
        Arc::new(ServerState {
            registry: Arc::new(Registry::new(RegistryConfig {
                max_clients,
                max_rooms: 4,
            })),
            codec: LineCodec,
        })
    }

    #[tokio::test]
    async fn test_handle_connection_replies_then_releases_on_eof() {
        let state = state(4);
        let (conn, record) = ScriptedConnection::new(1, &["PING\r\n"], false);
        let (_tx, rx) = watch::channel(false);

        handle_connection(conn, Arc::clone(&state), rx).await.unwrap();

        let record = record.lock().unwrap();
        assert_eq!(record.sent, b"PONG\r\n");
        assert!(record.closed);
        assert_eq!(state.registry.client_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_connection_send_failure_closes_and_releases() {
        let state = state(4);
        let (conn, record) =
            ScriptedConnection::new(1, &["PING\r\n", "PING\r\n"], true);
        let (_tx, rx) = watch::channel(false);

        let result = handle_connection(conn, Arc::clone(&state), rx).await;

        assert!(result.is_ok(), "got {result:?}");
        let record = record.lock().unwrap();
        assert!(record.closed, "closing step must run after a failed send");
        assert_eq!(record.pending.len(), 1, "loop must stop at the failed send");
        assert_eq!(state.registry.client_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_connection_server_full_sends_error_and_closes() {
        let state = state(0);
        let (conn, record) = ScriptedConnection::new(1, &["PING\r\n"], false);
        let (_tx, rx) = watch::channel(false);

        let result = handle_connection(conn, state, rx).await;

        assert!(matches!(
            result,
            Err(LobbyError::Registry(RegistryError::ClientCapacity(0)))
        ));
        let record = record.lock().unwrap();
        assert_eq!(record.sent, b"ERR 200 SERVER_FULL\r\n");
        assert!(record.closed);
        assert_eq!(record.pending.len(), 1, "protocol loop must not start");
    }

    #[tokio::test]
    async fn test_handle_connection_server_full_survives_failed_close() {
        let state = state(0);
        let (conn, record) = ScriptedConnection::new(1, &[], true);
        let (_tx, rx) = watch::channel(false);

        let result = handle_connection(conn, state, rx).await;

        assert!(matches!(result, Err(LobbyError::Registry(_))));
        assert!(record.lock().unwrap().closed);
    }

    #[tokio::test]
    async fn test_handle_connection_stops_on_shutdown() {
        let state = state(4);
        let (conn, record) = ScriptedConnection::new(1, &["PING\r\n"], false);
        let (tx, rx) = watch::channel(false);
        tx.send_replace(true);

        handle_connection(conn, Arc::clone(&state), rx).await.unwrap();

        let record = record.lock().unwrap();
        assert!(record.sent.is_empty());
        assert!(record.closed);
        assert_eq!(state.registry.client_count(), 0);
    }
}
