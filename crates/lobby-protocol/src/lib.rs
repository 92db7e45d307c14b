//! Wire protocol for Lobby.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientId`], [`RoomId`], [`RoomSummary`]): identities
//!   and the room listing row.
//! - **Commands** ([`Command`]): what a client line means.
//! - **Replies** ([`Reply`], [`ErrorCode`]): what the server answers.
//! - **Codec** ([`LineCodec`]): CR LF framing of both directions.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw lines) and the server's
//! state machine. It doesn't know about registries or connections beyond
//! their ids; it only knows how text maps to commands and back.
//!
//! ```text
//! Transport (bytes) → Protocol (Command / Reply) → State machine
//! ```

mod codec;
mod command;
mod error;
mod reply;
mod types;

pub use codec::LineCodec;
pub use command::Command;
pub use error::ProtocolError;
pub use reply::{ErrorCode, Reply};
pub use types::{
    ClientId, NICK_MAX_LEN, ROOM_CAPACITY, ROOM_NAME_MAX_LEN, RoomId,
    RoomStatus, RoomSummary, truncate_chars,
};
