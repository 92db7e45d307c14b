//! Client commands.
//!
//! A line is a command word followed by space-separated arguments. Only
//! the first argument is meaningful for any command; anything after it
//! is ignored. Command words are case-sensitive.
//!
//! Arguments stay optional at this layer. Whether a missing one is an
//! error depends on the client's state, which only the state machine
//! knows.

/// One parsed client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `HELLO <nick>`
    Hello { nick: Option<String> },
    /// `LIST`
    List,
    /// `CREATE <name>`
    Create { name: Option<String> },
    /// `JOIN <id>`, id still unparsed.
    Join { room: Option<String> },
    /// `QUIT`
    Quit,
    /// `PING`
    Ping,
    /// Any other command word.
    Unknown(String),
}

impl Command {
    /// Parses a line with its terminator already stripped.
    ///
    /// Returns `None` for a line with no command word (empty or only
    /// spaces); such lines get no reply at all.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split(' ').filter(|w| !w.is_empty());
        let word = words.next()?;
        let arg = words.next().map(str::to_string);

        let cmd = match word {
            "HELLO" => Self::Hello { nick: arg },
            "LIST" => Self::List,
            "CREATE" => Self::Create { name: arg },
            "JOIN" => Self::Join { room: arg },
            "QUIT" => Self::Quit,
            "PING" => Self::Ping,
            other => Self::Unknown(other.to_string()),
        };
        Some(cmd)
    }
}
