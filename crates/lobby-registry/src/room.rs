//! Room storage held inside the registry's tables.

use lobby_protocol::{ClientId, ROOM_CAPACITY, RoomId, RoomSummary};

/// One room as stored in a registry slot.
///
/// Occupancy is never stored separately; it is the number of filled
/// seats, so the two can't disagree.
#[derive(Debug, Clone)]
pub(crate) struct Room {
    pub(crate) id: RoomId,
    name: String,
    seats: [Option<ClientId>; ROOM_CAPACITY],
}

impl Room {
    pub(crate) fn new(id: RoomId, name: String) -> Self {
        Self {
            id,
            name,
            seats: [None; ROOM_CAPACITY],
        }
    }

    pub(crate) fn occupancy(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }

    /// Puts `client` in the first free seat. Returns `false` if the room
    /// is full.
    pub(crate) fn seat(&mut self, client: ClientId) -> bool {
        match self.seats.iter_mut().find(|s| s.is_none()) {
            Some(seat) => {
                *seat = Some(client);
                true
            }
            None => false,
        }
    }

    /// Empties every seat held by `client`, returning how many.
    pub(crate) fn vacate(&mut self, client: ClientId) -> usize {
        let mut freed = 0;
        for seat in &mut self.seats {
            if *seat == Some(client) {
                *seat = None;
                freed += 1;
            }
        }
        freed
    }

    pub(crate) fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id,
            name: self.name.clone(),
            occupancy: self.occupancy(),
        }
    }
}
