//! Unified error type for the Lobby server.

use lobby_protocol::ProtocolError;
use lobby_registry::RegistryError;
use lobby_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (bad encoding, bad argument).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry error (capacity, unknown room, room full).
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
