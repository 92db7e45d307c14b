//! Server replies and their wire rendering.

use std::fmt;

use crate::{ROOM_CAPACITY, RoomId, RoomSummary};

/// Numbered error classes sent as `ERR <code> <KEYWORD> [detail]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing or unparsable argument, or unknown command.
    BadFormat,
    /// Command issued before authentication.
    InvalidState,
    /// Every seat in the room is taken.
    RoomFull,
    /// No room has the requested id.
    UnknownRoom,
    /// No free client or room slot left.
    ServerFull,
}

impl ErrorCode {
    /// Numeric code on the wire.
    pub fn code(self) -> u16 {
        match self {
            Self::BadFormat => 100,
            Self::InvalidState => 101,
            Self::RoomFull => 102,
            Self::UnknownRoom => 104,
            Self::ServerFull => 200,
        }
    }

    /// Keyword following the code.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::BadFormat => "BAD_FORMAT",
            Self::InvalidState => "INVALID_STATE",
            Self::RoomFull => "ROOM_FULL",
            Self::UnknownRoom => "UNKNOWN_ROOM",
            Self::ServerFull => "SERVER_FULL",
        }
    }
}

/// A single reply line, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `WELCOME <token>`
    Welcome { token: String },
    /// `ROOM_LIST <n>`, header of a listing.
    RoomList { count: usize },
    /// `ROOM <id> <name> <occ>/2 <status>`, one listing row.
    Room(RoomSummary),
    /// `ROOM_CREATED <id>`
    RoomCreated(RoomId),
    /// `ROOM_JOINED <id>`
    RoomJoined(RoomId),
    /// `OK bye`
    Bye,
    /// `PONG`
    Pong,
    /// `ERR <code> <KEYWORD> [detail]`
    Error {
        code: ErrorCode,
        detail: Option<&'static str>,
    },
}

impl Reply {
    /// An error reply with no detail word.
    pub fn error(code: ErrorCode) -> Self {
        Self::Error { code, detail: None }
    }

    /// An error reply with a detail word.
    pub fn error_with(code: ErrorCode, detail: &'static str) -> Self {
        Self::Error {
            code,
            detail: Some(detail),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome { token } => write!(f, "WELCOME {token}"),
            Self::RoomList { count } => write!(f, "ROOM_LIST {count}"),
            Self::Room(room) => write!(
                f,
                "ROOM {} {} {}/{} {}",
                room.room_id.0,
                room.name,
                room.occupancy,
                ROOM_CAPACITY,
                room.status()
            ),
            Self::RoomCreated(id) => write!(f, "ROOM_CREATED {}", id.0),
            Self::RoomJoined(id) => write!(f, "ROOM_JOINED {}", id.0),
            Self::Bye => f.write_str("OK bye"),
            Self::Pong => f.write_str("PONG"),
            Self::Error { code, detail } => {
                write!(f, "ERR {} {}", code.code(), code.keyword())?;
                if let Some(detail) = detail {
                    write!(f, " {detail}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_error_with_detail() {
        let reply = Reply::error_with(ErrorCode::InvalidState, "not_auth");
        assert_eq!(reply.to_string(), "ERR 101 INVALID_STATE not_auth");
    }

    #[test]
    fn test_display_error_without_detail() {
        assert_eq!(
            Reply::error(ErrorCode::ServerFull).to_string(),
            "ERR 200 SERVER_FULL"
        );
        assert_eq!(
            Reply::error(ErrorCode::UnknownRoom).to_string(),
            "ERR 104 UNKNOWN_ROOM"
        );
        assert_eq!(
            Reply::error(ErrorCode::RoomFull).to_string(),
            "ERR 102 ROOM_FULL"
        );
    }

    #[test]
    fn test_display_room_row() {
        let open = Reply::Room(RoomSummary {
            room_id: RoomId(1),
            name: "Arena".into(),
            occupancy: 1,
        });
        let full = Reply::Room(RoomSummary {
            room_id: RoomId(2),
            name: "Pit".into(),
            occupancy: 2,
        });
        assert_eq!(open.to_string(), "ROOM 1 Arena 1/2 OPEN");
        assert_eq!(full.to_string(), "ROOM 2 Pit 2/2 PLAYING");
    }

    #[test]
    fn test_display_simple_replies() {
        assert_eq!(
            Reply::Welcome {
                token: "abc".into()
            }
            .to_string(),
            "WELCOME abc"
        );
        assert_eq!(Reply::RoomList { count: 0 }.to_string(), "ROOM_LIST 0");
        assert_eq!(Reply::RoomCreated(RoomId(4)).to_string(), "ROOM_CREATED 4");
        assert_eq!(Reply::RoomJoined(RoomId(4)).to_string(), "ROOM_JOINED 4");
        assert_eq!(Reply::Bye.to_string(), "OK bye");
        assert_eq!(Reply::Pong.to_string(), "PONG");
    }
}
