//! Error types for the protocol layer.
//!
//! Each crate in Lobby defines its own error enum. A `ProtocolError`
//! means the bytes or an argument didn't fit the grammar; it never means
//! the network or the registry failed.

/// Errors that can occur while decoding client input.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    /// A room id argument is not an integer.
    #[error("invalid room id: {0:?}")]
    InvalidRoomId(String),

    /// A room id argument is an integer no room can have.
    #[error("room id {0} is out of range")]
    RoomIdOutOfRange(i64),
}
