//! # Lobby
//!
//! A matchmaking server for two-player games. Clients connect over TCP,
//! say `HELLO` with a nickname, then list, create and join rooms of two
//! seats using a line-based text protocol.
//!
//! The moving parts:
//!
//! - [`LobbyServer`]: binds, accepts, spawns one task per connection
//! - [`ProtocolMachine`]: applies one client's commands to the registry
//! - [`Registry`](lobby_registry::Registry): the shared, locked store of
//!   clients and rooms
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lobby::prelude::*;
//!
//! # async fn example() -> Result<(), LobbyError> {
//! let server = LobbyServer::builder()
//!     .bind("0.0.0.0:10000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
pub mod logging;
mod machine;
mod server;

pub use error::LobbyError;
pub use machine::ProtocolMachine;
pub use server::{DEFAULT_PORT, LobbyServer, LobbyServerBuilder};

/// Everything needed to embed a server, in one import.
pub mod prelude {
    pub use crate::{DEFAULT_PORT, LobbyError, LobbyServer, LobbyServerBuilder};
    pub use lobby_protocol::{Command, ErrorCode, Reply, RoomId, RoomSummary};
    pub use lobby_registry::{Registry, RegistryConfig, RegistryError};
}
