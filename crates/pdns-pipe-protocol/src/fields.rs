//! Splits request lines into a command tag and its arguments.
//!
//! Fields are separated by a single tab with no quoting or escaping, so a
//! field value can never contain a tab. Empty fields between separators are
//! kept, but trailing empty fields are dropped: `AXFR\t` carries no argument
//! and fails the arity check.

/// Field separator shared by requests and responses.
pub const SEPARATOR: char = '\t';

/// Command named by the first field of a request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `HELO`: version negotiation.
    Handshake,
    /// `Q`: name lookup.
    Query,
    /// `AXFR`: zone transfer.
    AxfrRequest,
    /// `PING`: liveness check.
    Ping,
    /// Any other tag, including an empty line.
    Unknown,
}

impl CommandKind {
    /// Maps a tag onto its command; unmatched tags yield [`Self::Unknown`].
    ///
    /// Tags are case-sensitive.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "HELO" => Self::Handshake,
            "Q" => Self::Query,
            "AXFR" => Self::AxfrRequest,
            "PING" => Self::Ping,
            _ => Self::Unknown,
        }
    }

    /// Wire tag for known commands.
    #[must_use]
    pub const fn tag(self) -> Option<&'static str> {
        match self {
            Self::Handshake => Some("HELO"),
            Self::Query => Some("Q"),
            Self::AxfrRequest => Some("AXFR"),
            Self::Ping => Some("PING"),
            Self::Unknown => None,
        }
    }
}

/// A request line split into fields, borrowing from the raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLine<'a> {
    line: &'a str,
    kind: CommandKind,
    args: Vec<&'a str>,
}

impl<'a> DecodedLine<'a> {
    /// Decodes one line with its terminator already removed.
    #[must_use]
    pub fn decode(line: &'a str) -> Self {
        if line.is_empty() {
            return Self {
                line,
                kind: CommandKind::Unknown,
                args: Vec::new(),
            };
        }

        let mut fields = line.split(SEPARATOR);
        let kind = fields.next().map_or(CommandKind::Unknown, CommandKind::from_tag);
        let mut args: Vec<&str> = fields.collect();
        while args.last() == Some(&"") {
            args.pop();
        }
        Self { line, kind, args }
    }

    /// The raw line as received.
    #[must_use]
    pub const fn line(&self) -> &'a str {
        self.line
    }

    /// Command named by the tag.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Fields following the tag.
    #[must_use]
    pub fn args(&self) -> &[&'a str] {
        &self.args
    }

    /// Owned copy of the arguments, used in rejection messages.
    #[must_use]
    pub fn owned_args(&self) -> Vec<String> {
        self.args.iter().map(|arg| (*arg).to_owned()).collect()
    }
}
