//! Error types for the registry.

use lobby_protocol::RoomId;

/// Errors returned by [`Registry`](crate::Registry) operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Every client slot is taken.
    #[error("client table full ({0} slots)")]
    ClientCapacity(usize),

    /// Every room slot is taken.
    #[error("room table full ({0} slots)")]
    RoomCapacity(usize),

    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room has no free seat.
    #[error("room {0} is full")]
    RoomFull(RoomId),
}

impl RegistryError {
    /// `true` for either capacity variant.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::ClientCapacity(_) | Self::RoomCapacity(_))
    }
}
