//! The per-connection protocol state machine.
//!
//! [`ProtocolMachine`] owns one [`Client`] and a handle to the shared
//! [`Registry`]. Each inbound line goes through [`handle_line`], which
//! applies exactly one command and returns the reply lines to send.
//! Nothing here touches the network, and every failure the client can
//! cause becomes an `ERR` reply rather than an `Err`.
//!
//! [`handle_line`]: ProtocolMachine::handle_line

use std::sync::Arc;

use lobby_protocol::{Command, ErrorCode, LineCodec, ProtocolError, Reply, RoomId};
use lobby_registry::{Registry, RegistryError};
use lobby_session::Client;

/// Interprets one client's commands against the registry.
pub struct ProtocolMachine {
    client: Client,
    registry: Arc<Registry>,
    codec: LineCodec,
}

impl ProtocolMachine {
    /// Starts a machine for a freshly accepted client.
    pub fn new(client: Client, registry: Arc<Registry>) -> Self {
        Self {
            client,
            registry,
            codec: LineCodec,
        }
    }

    /// The client as it stands after the commands seen so far.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Handles one raw line from the transport.
    ///
    /// Blank lines return no replies. A line that isn't UTF-8 is answered
    /// with `BAD_FORMAT` and otherwise ignored.
    pub fn handle_line(&mut self, raw: &[u8]) -> Vec<Reply> {
        self.client.touch();

        let line = match self.codec.decode(raw) {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(client_id = %self.client.id(), error = %e, "undecodable line");
                return vec![Reply::error_with(ErrorCode::BadFormat, "invalid_encoding")];
            }
        };

        match Command::parse(line) {
            Some(cmd) => self.handle(cmd),
            None => Vec::new(),
        }
    }

    /// Applies one parsed command.
    pub fn handle(&mut self, cmd: Command) -> Vec<Reply> {
        tracing::trace!(client_id = %self.client.id(), ?cmd, "command");

        match cmd {
            Command::Hello { nick } => vec![self.hello(nick)],
            Command::List => self.list(),
            Command::Create { name } => vec![self.create(name)],
            Command::Join { room } => vec![self.join(room)],
            Command::Quit => vec![Reply::Bye],
            Command::Ping => vec![Reply::Pong],
            Command::Unknown(word) => {
                tracing::debug!(client_id = %self.client.id(), %word, "unknown command");
                vec![Reply::error_with(ErrorCode::BadFormat, "unknown_command")]
            }
        }
    }

    fn hello(&mut self, nick: Option<String>) -> Reply {
        let Some(nick) = nick else {
            return Reply::error_with(ErrorCode::BadFormat, "missing_nick");
        };
        let token = self.client.authenticate(&nick).to_string();
        Reply::Welcome { token }
    }

    fn list(&self) -> Vec<Reply> {
        if !self.client.is_authenticated() {
            return vec![Reply::error_with(ErrorCode::InvalidState, "not_auth")];
        }

        // One locked snapshot; rendering happens after the lock is gone.
        let rooms = self.registry.list_rooms();
        let mut replies = Vec::with_capacity(rooms.len() + 1);
        replies.push(Reply::RoomList { count: rooms.len() });
        replies.extend(rooms.into_iter().map(Reply::Room));
        replies
    }

    fn create(&mut self, name: Option<String>) -> Reply {
        if !self.client.is_authenticated() {
            return Reply::error(ErrorCode::InvalidState);
        }
        let Some(name) = name else {
            return Reply::error_with(ErrorCode::BadFormat, "missing_room_name");
        };

        match self.registry.create_room(&name) {
            Ok(room_id) => Reply::RoomCreated(room_id),
            Err(e) => registry_failure(&e),
        }
    }

    /// JOIN has no authentication floor: an unauthenticated client may
    /// take a seat.
    fn join(&mut self, room: Option<String>) -> Reply {
        let Some(raw) = room else {
            return Reply::error_with(ErrorCode::BadFormat, "missing_room_id");
        };
        let room_id: RoomId = match raw.parse() {
            Ok(id) => id,
            Err(ProtocolError::RoomIdOutOfRange(n)) => {
                tracing::debug!(client_id = %self.client.id(), room_id = n, "JOIN for impossible room id");
                return Reply::error(ErrorCode::UnknownRoom);
            }
            Err(e) => {
                tracing::debug!(client_id = %self.client.id(), error = %e, "bad JOIN argument");
                return Reply::error_with(ErrorCode::BadFormat, "invalid_room_id");
            }
        };

        match self.registry.join_room(room_id, self.client.id()) {
            Ok(()) => {
                self.client.enter_room(room_id);
                Reply::RoomJoined(room_id)
            }
            Err(e) => registry_failure(&e),
        }
    }
}

/// Maps a registry refusal to the reply the client sees.
fn registry_failure(err: &RegistryError) -> Reply {
    if err.is_capacity() {
        return Reply::error(ErrorCode::ServerFull);
    }
    match err {
        RegistryError::NotFound(_) => Reply::error(ErrorCode::UnknownRoom),
        _ => Reply::error(ErrorCode::RoomFull),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lobby_protocol::ClientId;
    use lobby_registry::RegistryConfig;
    use lobby_session::ClientState;

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::default())
    }

    fn machine(id: u64, registry: &Arc<Registry>) -> ProtocolMachine {
        ProtocolMachine::new(Client::new(ClientId(id)), Arc::clone(registry))
    }

    /// Feeds one line and renders the replies the way they go on the wire.
    fn send(m: &mut ProtocolMachine, line: &str) -> Vec<String> {
        m.handle_line(format!("{line}\r\n").as_bytes())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    // =====================================================================
    // HELLO
    // =====================================================================

    #[test]
    fn test_hello_returns_welcome_and_authenticates() {
        let reg = registry();
        let mut m = machine(1, &reg);

        let replies = send(&mut m, "HELLO alice");

        assert_eq!(replies.len(), 1);
        let token = replies[0].strip_prefix("WELCOME ").expect("WELCOME line");
        assert_eq!(token.len(), 32);
        assert_eq!(m.client().state(), ClientState::Authenticated);
        assert_eq!(m.client().nickname(), "alice");
    }

    #[test]
    fn test_hello_twice_gives_fresh_token() {
        let reg = registry();
        let mut m = machine(1, &reg);

        let first = send(&mut m, "HELLO alice");
        let second = send(&mut m, "HELLO alice");

        assert_ne!(first, second);
    }

    #[test]
    fn test_hello_without_nick_is_bad_format() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(send(&mut m, "HELLO"), ["ERR 100 BAD_FORMAT missing_nick"]);
        assert_eq!(m.client().state(), ClientState::Connected);
    }

    // =====================================================================
    // LIST
    // =====================================================================

    #[test]
    fn test_list_before_hello_is_invalid_state() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(send(&mut m, "LIST"), ["ERR 101 INVALID_STATE not_auth"]);
    }

    #[test]
    fn test_list_after_hello_with_no_rooms() {
        let reg = registry();
        let mut m = machine(1, &reg);
        send(&mut m, "HELLO alice");

        assert_eq!(send(&mut m, "LIST"), ["ROOM_LIST 0"]);
    }

    #[test]
    fn test_list_reports_rooms_in_order_with_occupancy() {
        let reg = registry();
        let mut a = machine(1, &reg);
        let mut b = machine(2, &reg);
        send(&mut a, "HELLO alice");
        send(&mut a, "CREATE Arena");
        send(&mut a, "CREATE Pit");
        send(&mut a, "JOIN 1");
        send(&mut b, "JOIN 1");
        send(&mut b, "JOIN 2");

        assert_eq!(
            send(&mut a, "LIST"),
            ["ROOM_LIST 2", "ROOM 1 Arena 2/2 PLAYING", "ROOM 2 Pit 1/2 OPEN"]
        );
    }

    // =====================================================================
    // CREATE
    // =====================================================================

    #[test]
    fn test_create_allocates_sequential_ids() {
        let reg = registry();
        let mut m = machine(1, &reg);
        send(&mut m, "HELLO alice");

        assert_eq!(send(&mut m, "CREATE Arena"), ["ROOM_CREATED 1"]);
        assert_eq!(send(&mut m, "CREATE Arena"), ["ROOM_CREATED 2"]);
    }

    #[test]
    fn test_create_before_hello_is_invalid_state() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(send(&mut m, "CREATE Arena"), ["ERR 101 INVALID_STATE"]);
        assert_eq!(reg.room_count(), 0);
    }

    #[test]
    fn test_create_checks_state_before_name() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(send(&mut m, "CREATE"), ["ERR 101 INVALID_STATE"]);
    }

    #[test]
    fn test_create_without_name_is_bad_format() {
        let reg = registry();
        let mut m = machine(1, &reg);
        send(&mut m, "HELLO alice");

        assert_eq!(
            send(&mut m, "CREATE"),
            ["ERR 100 BAD_FORMAT missing_room_name"]
        );
    }

    #[test]
    fn test_create_when_room_table_full_is_server_full() {
        let reg = Arc::new(Registry::new(RegistryConfig {
            max_clients: 4,
            max_rooms: 1,
        }));
        let mut m = machine(1, &reg);
        send(&mut m, "HELLO alice");
        send(&mut m, "CREATE Arena");

        assert_eq!(send(&mut m, "CREATE Pit"), ["ERR 200 SERVER_FULL"]);
    }

    #[test]
    fn test_create_allowed_while_in_room() {
        let reg = registry();
        let mut m = machine(1, &reg);
        send(&mut m, "HELLO alice");
        send(&mut m, "CREATE Arena");
        send(&mut m, "JOIN 1");

        assert_eq!(send(&mut m, "CREATE Pit"), ["ROOM_CREATED 2"]);
    }

    // =====================================================================
    // JOIN
    // =====================================================================

    #[test]
    fn test_join_seats_client_and_moves_to_in_room() {
        let reg = registry();
        let mut m = machine(1, &reg);
        send(&mut m, "HELLO alice");
        send(&mut m, "CREATE Arena");

        assert_eq!(send(&mut m, "JOIN 1"), ["ROOM_JOINED 1"]);
        assert_eq!(m.client().state(), ClientState::InRoom);
        assert_eq!(m.client().room(), Some(RoomId(1)));
        assert_eq!(send(&mut m, "LIST")[1], "ROOM 1 Arena 1/2 OPEN");
    }

    #[test]
    fn test_join_third_client_is_room_full() {
        let reg = registry();
        let mut a = machine(1, &reg);
        let mut b = machine(2, &reg);
        let mut c = machine(3, &reg);
        send(&mut a, "HELLO a");
        send(&mut a, "CREATE Arena");

        assert_eq!(send(&mut a, "JOIN 1"), ["ROOM_JOINED 1"]);
        assert_eq!(send(&mut b, "JOIN 1"), ["ROOM_JOINED 1"]);
        assert_eq!(send(&mut c, "JOIN 1"), ["ERR 102 ROOM_FULL"]);
        assert_eq!(c.client().state(), ClientState::Connected);
    }

    #[test]
    fn test_join_unknown_room() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(send(&mut m, "JOIN 999"), ["ERR 104 UNKNOWN_ROOM"]);
    }

    #[test]
    fn test_join_without_id_is_bad_format() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(send(&mut m, "JOIN"), ["ERR 100 BAD_FORMAT missing_room_id"]);
    }

    #[test]
    fn test_join_with_non_integer_id_is_bad_format() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(
            send(&mut m, "JOIN abc"),
            ["ERR 100 BAD_FORMAT invalid_room_id"]
        );
        assert_eq!(
            send(&mut m, "JOIN 12abc"),
            ["ERR 100 BAD_FORMAT invalid_room_id"]
        );
    }

    #[test]
    fn test_join_with_negative_id_is_unknown_room() {
        let reg = registry();
        let mut m = machine(1, &reg);
        send(&mut m, "HELLO alice");
        send(&mut m, "CREATE Arena");

        assert_eq!(send(&mut m, "JOIN -1"), ["ERR 104 UNKNOWN_ROOM"]);
        assert_eq!(m.client().state(), ClientState::Authenticated);
    }

    #[test]
    fn test_join_reachable_before_hello() {
        let reg = registry();
        let mut owner = machine(1, &reg);
        let mut m = machine(2, &reg);
        send(&mut owner, "HELLO owner");
        send(&mut owner, "CREATE Arena");

        assert_eq!(send(&mut m, "JOIN 1"), ["ROOM_JOINED 1"]);
        assert_eq!(m.client().state(), ClientState::InRoom);
    }

    // =====================================================================
    // QUIT / PING / unknown / blank
    // =====================================================================

    #[test]
    fn test_ping_in_every_state() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(send(&mut m, "PING"), ["PONG"]);
        send(&mut m, "HELLO alice");
        assert_eq!(send(&mut m, "PING"), ["PONG"]);
        send(&mut m, "CREATE Arena");
        send(&mut m, "JOIN 1");
        assert_eq!(send(&mut m, "PING"), ["PONG"]);
    }

    #[test]
    fn test_quit_replies_bye_without_state_change() {
        let reg = registry();
        let mut m = machine(1, &reg);
        send(&mut m, "HELLO alice");

        assert_eq!(send(&mut m, "QUIT"), ["OK bye"]);
        assert_eq!(m.client().state(), ClientState::Authenticated);
    }

    #[test]
    fn test_unknown_command_is_bad_format() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert_eq!(
            send(&mut m, "DANCE now"),
            ["ERR 100 BAD_FORMAT unknown_command"]
        );
    }

    #[test]
    fn test_blank_line_yields_nothing() {
        let reg = registry();
        let mut m = machine(1, &reg);

        assert!(send(&mut m, "").is_empty());
        assert!(send(&mut m, "   ").is_empty());
        assert_eq!(m.client().state(), ClientState::Connected);
    }

    #[test]
    fn test_invalid_utf8_is_bad_format() {
        let reg = registry();
        let mut m = machine(1, &reg);

        let replies = m.handle_line(b"HELLO \xff\r\n");

        assert_eq!(
            replies,
            [Reply::error_with(ErrorCode::BadFormat, "invalid_encoding")]
        );
        assert_eq!(m.client().state(), ClientState::Connected);
    }

    #[test]
    fn test_every_line_refreshes_last_seen() {
        let reg = registry();
        let mut m = machine(1, &reg);
        let before = m.client().last_seen();

        m.handle_line(b"\r\n");

        assert!(m.client().last_seen() >= before);
    }
}
