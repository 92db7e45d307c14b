//! The registry: every live client and every room, behind one lock.
//!
//! # Concurrency note
//!
//! All state (client table, room table, room-id counter) sits in a single
//! `Tables` value guarded by one `std::sync::Mutex`. Every public method
//! takes the lock, does its whole read-check-write, and releases it
//! before returning. Nothing here is `async`, so the guard can never be
//! held across an `.await` by construction, and callers only ever see
//! copies ([`RoomSummary`]) of what is inside.
//!
//! A poisoned lock is recovered rather than propagated: each method
//! leaves the tables consistent before anything that could panic.

use std::sync::{Mutex, MutexGuard, PoisonError};

use lobby_protocol::{
    ClientId, ROOM_NAME_MAX_LEN, RoomId, RoomSummary, truncate_chars,
};

use crate::room::Room;
use crate::{RegistryConfig, RegistryError};

/// Fixed-size slot tables. Allocation is always "first free slot".
struct Tables {
    clients: Vec<Option<ClientId>>,
    rooms: Vec<Option<Room>>,
    next_room_id: u64,
}

impl Tables {
    fn room_mut(&mut self, room_id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().flatten().find(|r| r.id == room_id)
    }
}

/// Shared, internally synchronised store of clients and rooms.
///
/// Share it between connection tasks with an `Arc<Registry>`.
pub struct Registry {
    tables: Mutex<Tables>,
    config: RegistryConfig,
}

impl Registry {
    /// Creates an empty registry with the given capacities.
    pub fn new(config: RegistryConfig) -> Self {
        let tables = Tables {
            clients: vec![None; config.max_clients],
            rooms: vec![None; config.max_rooms],
            next_room_id: 1,
        };
        Self {
            tables: Mutex::new(tables),
            config,
        }
    }

    /// The capacities this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =====================================================================
    // Clients
    // =====================================================================

    /// Claims the first free client slot.
    ///
    /// Registering an id that is already present is a no-op success.
    ///
    /// # Errors
    /// [`RegistryError::ClientCapacity`] when every slot is taken.
    pub fn register_client(&self, client: ClientId) -> Result<(), RegistryError> {
        let mut tables = self.lock();
        if tables.clients.contains(&Some(client)) {
            return Ok(());
        }
        let slot = tables
            .clients
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(RegistryError::ClientCapacity(self.config.max_clients))?;
        *slot = Some(client);
        tracing::debug!(%client, "client registered");
        Ok(())
    }

    /// Frees the client's slot and vacates every seat it holds, in one
    /// critical section. Returns the rooms that lost an occupant.
    ///
    /// Unknown ids are ignored, so this is safe to call twice.
    pub fn unregister_client(&self, client: ClientId) -> Vec<RoomId> {
        let mut tables = self.lock();

        if let Some(slot) = tables.clients.iter_mut().find(|s| **s == Some(client)) {
            *slot = None;
        }

        let mut vacated = Vec::new();
        for room in tables.rooms.iter_mut().flatten() {
            if room.vacate(client) > 0 {
                vacated.push(room.id);
            }
        }
        drop(tables);

        for room_id in &vacated {
            tracing::info!(%client, %room_id, "seat released");
        }
        vacated
    }

    /// Number of registered clients.
    pub fn client_count(&self) -> usize {
        self.lock().clients.iter().flatten().count()
    }

    // =====================================================================
    // Rooms
    // =====================================================================

    /// Creates a room in the first free slot and returns its id.
    ///
    /// Ids come from a counter starting at 1 that only moves forward, and
    /// only when a room is actually created. The name is truncated to
    /// [`ROOM_NAME_MAX_LEN`] characters.
    ///
    /// # Errors
    /// [`RegistryError::RoomCapacity`] when every slot is taken.
    pub fn create_room(&self, name: &str) -> Result<RoomId, RegistryError> {
        let mut tables = self.lock();
        let index = tables
            .rooms
            .iter()
            .position(Option::is_none)
            .ok_or(RegistryError::RoomCapacity(self.config.max_rooms))?;

        let room_id = RoomId(tables.next_room_id);
        tables.next_room_id += 1;
        tables.rooms[index] = Some(Room::new(
            room_id,
            truncate_chars(name, ROOM_NAME_MAX_LEN),
        ));
        drop(tables);

        tracing::info!(%room_id, name, "room created");
        Ok(room_id)
    }

    /// Returns a snapshot of one room.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] if no room has that id.
    pub fn find_room(&self, room_id: RoomId) -> Result<RoomSummary, RegistryError> {
        self.lock()
            .rooms
            .iter()
            .flatten()
            .find(|r| r.id == room_id)
            .map(Room::summary)
            .ok_or(RegistryError::NotFound(room_id))
    }

    /// Snapshots every room in slot order.
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.lock().rooms.iter().flatten().map(Room::summary).collect()
    }

    /// Number of rooms that exist.
    pub fn room_count(&self) -> usize {
        self.lock().rooms.iter().flatten().count()
    }

    /// Seats `client` in the first free seat of the room.
    ///
    /// The occupancy check and the seat assignment happen under the same
    /// lock, so two racing joins for the last seat can't both win.
    ///
    /// # Errors
    /// - [`RegistryError::NotFound`]: no such room
    /// - [`RegistryError::RoomFull`]: both seats taken
    pub fn join_room(&self, room_id: RoomId, client: ClientId) -> Result<(), RegistryError> {
        let mut tables = self.lock();
        let room = tables
            .room_mut(room_id)
            .ok_or(RegistryError::NotFound(room_id))?;
        if !room.seat(client) {
            return Err(RegistryError::RoomFull(room_id));
        }
        let occupancy = room.occupancy();
        drop(tables);

        tracing::info!(%client, %room_id, occupancy, "room joined");
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================
