//! The per-connection client record.

use std::time::Instant;

use lobby_protocol::{ClientId, NICK_MAX_LEN, RoomId, truncate_chars};

use crate::generate_token;

// ---------------------------------------------------------------------------
// ClientState
// ---------------------------------------------------------------------------

/// How far a client has come through the protocol.
///
/// The variants are ordered, and commands that need authentication
/// compare against [`ClientState::Authenticated`] as a floor:
///
/// ```text
///   Connected ──(HELLO)──→ Authenticated ──(JOIN)──→ InRoom
/// ```
///
/// There is no separate lobby state: an authenticated client with no
/// room *is* in the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClientState {
    /// Accepted, no HELLO yet.
    Connected,
    /// Said HELLO; in the lobby unless a room is recorded.
    Authenticated,
    /// Seated in a room.
    InRoom,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// One connected client.
#[derive(Debug, Clone)]
pub struct Client {
    id: ClientId,
    nickname: String,
    token: Option<String>,
    state: ClientState,
    room: Option<RoomId>,
    last_seen: Instant,
}

impl Client {
    /// A freshly accepted, unauthenticated client.
    pub fn new(id: ClientId) -> Self {
        Self {
            id,
            nickname: String::new(),
            token: None,
            state: ClientState::Connected,
            room: None,
            last_seen: Instant::now(),
        }
    }

    /// The connection this client is bound to.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Nickname from the last HELLO; empty before the first one.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Token issued by the last HELLO.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Current protocol state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// The room most recently joined, if any.
    pub fn room(&self) -> Option<RoomId> {
        self.room
    }

    /// When the client last sent a line.
    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// `true` once HELLO has succeeded, whether or not seated.
    pub fn is_authenticated(&self) -> bool {
        self.state >= ClientState::Authenticated
    }

    /// Records activity from the client.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Applies a HELLO: stores the (truncated) nickname, issues a new
    /// token and moves to `Authenticated`. Returns the new token.
    ///
    /// Allowed from any state, repeatedly. A seated client keeps its
    /// room reference; only the state word changes.
    pub fn authenticate(&mut self, nick: &str) -> &str {
        self.nickname = truncate_chars(nick, NICK_MAX_LEN);
        self.state = ClientState::Authenticated;
        tracing::info!(client_id = %self.id, nick = %self.nickname, "client authenticated");
        self.token.insert(generate_token())
    }

    /// Records a successful JOIN.
    pub fn enter_room(&mut self, room_id: RoomId) {
        self.room = Some(room_id);
        self.state = ClientState::InRoom;
    }
}
