//! Registry sizing.

use serde::{Deserialize, Serialize};

/// Default number of client slots.
pub const DEFAULT_MAX_CLIENTS: usize = 128;

/// Default number of room slots.
pub const DEFAULT_MAX_ROOMS: usize = 64;

/// Fixed capacities of the registry's slot tables.
///
/// Both tables are allocated up front and never grow. Rooms are never
/// removed, so `max_rooms` is also the number of rooms the server will
/// ever create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Concurrent connections admitted to the protocol loop.
    pub max_clients: usize,

    /// Rooms that can exist.
    pub max_rooms: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_clients: DEFAULT_MAX_CLIENTS,
            max_rooms: DEFAULT_MAX_ROOMS,
        }
    }
}
