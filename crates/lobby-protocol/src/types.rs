//! Identity and listing types shared by every layer above the transport.

use std::fmt;
use std::str::FromStr;

use lobby_transport::ConnectionId;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Number of seats in every room.
pub const ROOM_CAPACITY: usize = 2;

/// Longest nickname kept, in characters. Longer ones are truncated.
pub const NICK_MAX_LEN: usize = 32;

/// Longest room name kept, in characters. Longer ones are truncated.
pub const ROOM_NAME_MAX_LEN: usize = 64;

/// Cuts `s` down to at most `max` characters, never splitting a
/// character.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((end, _)) => s[..end].to_string(),
        None => s.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a connected client.
///
/// A client *is* its connection, so the id is taken straight from the
/// transport's [`ConnectionId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl From<ConnectionId> for ClientId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Server-assigned room id. Allocated from 1 upwards and never reused.
///
/// `Display` is the log form (`R-3`); the wire form is the bare number,
/// written by [`Reply`](crate::Reply).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s
            .parse()
            .map_err(|_| ProtocolError::InvalidRoomId(s.to_string()))?;
        u64::try_from(n)
            .map(RoomId)
            .map_err(|_| ProtocolError::RoomIdOutOfRange(n))
    }
}

// ---------------------------------------------------------------------------
// Room listing
// ---------------------------------------------------------------------------

/// Whether a room still has a free seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    /// At least one seat is free.
    Open,
    /// Every seat is taken.
    Playing,
}

impl RoomStatus {
    /// Derives the status from a seat count.
    pub fn from_occupancy(occupancy: usize) -> Self {
        if occupancy >= ROOM_CAPACITY {
            Self::Playing
        } else {
            Self::Open
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("OPEN"),
            Self::Playing => f.write_str("PLAYING"),
        }
    }
}

/// A point-in-time copy of one room, as reported by `LIST`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// The room's id.
    pub room_id: RoomId,
    /// Display name.
    pub name: String,
    /// Seats currently taken.
    pub occupancy: usize,
}

impl RoomSummary {
    /// `PLAYING` once both seats are taken, `OPEN` otherwise.
    pub fn status(&self) -> RoomStatus {
        RoomStatus::from_occupancy(self.occupancy)
    }
}
