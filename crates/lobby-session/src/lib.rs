//! Client session state for Lobby.
//!
//! Every accepted connection gets one [`Client`]: the server's record of
//! who is on the other end and how far through the protocol they are.
//!
//! # How it fits in the stack
//!
//! ```text
//! State machine (above)  ← reads and advances the Client per command
//!     ↕
//! Session Layer (this crate)  ← nickname, token, ClientState, current room
//!     ↕
//! Protocol Layer (below)  ← provides ClientId, RoomId, length limits
//! ```
//!
//! A `Client` is owned by its connection task alone. Nothing here is
//! shared or locked; shared state lives in the registry.

mod client;
mod token;

pub use client::{Client, ClientState};
pub use token::generate_token;
