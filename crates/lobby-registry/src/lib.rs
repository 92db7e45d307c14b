//! Shared matchmaking state for Lobby.
//!
//! The [`Registry`] is the only mutable state shared between connection
//! tasks. It owns a fixed-size client table, a fixed-size room table and
//! the room-id counter, all behind one lock.
//!
//! # Key types
//!
//! - [`Registry`]: the store and its atomic operations
//! - [`RegistryConfig`]: table capacities
//! - [`RegistryError`]: capacity, not-found and room-full failures

mod config;
mod error;
mod registry;
mod room;

pub use config::{DEFAULT_MAX_CLIENTS, DEFAULT_MAX_ROOMS, RegistryConfig};
pub use error::RegistryError;
pub use registry::Registry;
