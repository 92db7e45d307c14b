//! CR LF line codec.
//!
//! Inbound, a raw line from the transport has its trailing CR/LF bytes
//! trimmed and is checked for UTF-8. Outbound, each [`Reply`] is rendered
//! and terminated with CR LF. A bare LF from the client is accepted too,
//! since plenty of terminal tools send one.

use crate::{ProtocolError, Reply};

/// The line terminator written after every reply.
const TERMINATOR: &[u8] = b"\r\n";

/// Converts between raw transport lines and protocol text.
///
/// ## Example
///
/// ```rust
/// use lobby_protocol::{LineCodec, Reply};
///
/// let codec = LineCodec;
/// assert_eq!(codec.decode(b"PING\r\n").unwrap(), "PING");
/// assert_eq!(codec.encode(&Reply::Pong), b"PONG\r\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    /// Renders one reply with its terminator.
    pub fn encode(&self, reply: &Reply) -> Vec<u8> {
        let mut out = reply.to_string().into_bytes();
        out.extend_from_slice(TERMINATOR);
        out
    }

    /// Renders a batch of replies into one buffer so they go out in a
    /// single write.
    pub fn encode_all(&self, replies: &[Reply]) -> Vec<u8> {
        let mut out = Vec::new();
        for reply in replies {
            out.extend_from_slice(reply.to_string().as_bytes());
            out.extend_from_slice(TERMINATOR);
        }
        out
    }

    /// Strips trailing CR/LF bytes and decodes the rest as UTF-8.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidEncoding`] if the line isn't UTF-8.
    pub fn decode<'a>(&self, raw: &'a [u8]) -> Result<&'a str, ProtocolError> {
        let end = raw
            .iter()
            .rposition(|b| *b != b'\r' && *b != b'\n')
            .map_or(0, |i| i + 1);
        Ok(std::str::from_utf8(&raw[..end])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorCode, RoomId};

    #[test]
    fn test_decode_strips_crlf() {
        assert_eq!(LineCodec.decode(b"HELLO bob\r\n").unwrap(), "HELLO bob");
    }

    #[test]
    fn test_decode_accepts_bare_lf_and_no_terminator() {
        assert_eq!(LineCodec.decode(b"LIST\n").unwrap(), "LIST");
        assert_eq!(LineCodec.decode(b"LIST").unwrap(), "LIST");
    }

    #[test]
    fn test_decode_only_terminator_is_empty() {
        assert_eq!(LineCodec.decode(b"\r\n").unwrap(), "");
        assert_eq!(LineCodec.decode(b"").unwrap(), "");
    }

    #[test]
    fn test_decode_invalid_utf8_is_error() {
        let result = LineCodec.decode(b"HELLO \xff\xfe\r\n");
        assert!(matches!(result, Err(ProtocolError::InvalidEncoding(_))));
    }

    #[test]
    fn test_encode_appends_crlf() {
        let bytes = LineCodec.encode(&Reply::RoomCreated(RoomId(1)));
        assert_eq!(bytes, b"ROOM_CREATED 1\r\n");
    }

    #[test]
    fn test_encode_all_terminates_every_line() {
        let bytes = LineCodec.encode_all(&[
            Reply::RoomList { count: 0 },
            Reply::error(ErrorCode::ServerFull),
        ]);
        assert_eq!(bytes, b"ROOM_LIST 0\r\nERR 200 SERVER_FULL\r\n");
    }
}
