//! Typed values decoded from request lines and encoded into answers.
//!
//! Every record here lives for a single turn. Requests are only built once
//! their argument count has been checked against the arity table, so a value
//! of these types is always complete.

use std::fmt;

/// Negotiated pipe protocol version.
///
/// The version fixes how many arguments a `Q` line carries: version 2 adds
/// the local address the resolver received the question on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// `Q qname qclass qtype id remote-ip`.
    V1,
    /// `Q qname qclass qtype id remote-ip local-ip`.
    V2,
}

impl ProtocolVersion {
    /// Maps a handshake number onto a supported version.
    #[must_use]
    pub const fn from_number(number: u64) -> Option<Self> {
        match number {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    /// Number sent in the `HELO` line for this version.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Arguments a `Q` line must carry after its tag.
    #[must_use]
    pub const fn query_arity(self) -> usize {
        match self {
            Self::V1 => 5,
            Self::V2 => 6,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A name lookup delegated by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    qname: String,
    qclass: String,
    qtype: String,
    id: String,
    remote_ip: String,
    local_ip: Option<String>,
}

impl Query {
    /// Builds a query from `Q` arguments under the given version.
    ///
    /// Returns `None` unless `args` holds exactly
    /// [`ProtocolVersion::query_arity`] fields.
    #[must_use]
    pub fn from_args(version: ProtocolVersion, args: &[&str]) -> Option<Self> {
        match (version, args) {
            (ProtocolVersion::V1, [qname, qclass, qtype, id, remote_ip]) => Some(Self {
                qname: (*qname).to_owned(),
                qclass: (*qclass).to_owned(),
                qtype: (*qtype).to_owned(),
                id: (*id).to_owned(),
                remote_ip: (*remote_ip).to_owned(),
                local_ip: None,
            }),
            (ProtocolVersion::V2, [qname, qclass, qtype, id, remote_ip, local_ip]) => Some(Self {
                qname: (*qname).to_owned(),
                qclass: (*qclass).to_owned(),
                qtype: (*qtype).to_owned(),
                id: (*id).to_owned(),
                remote_ip: (*remote_ip).to_owned(),
                local_ip: Some((*local_ip).to_owned()),
            }),
            _ => None,
        }
    }

    /// Domain name being resolved.
    #[must_use]
    pub const fn qname(&self) -> &str {
        self.qname.as_str()
    }

    /// Query class, normally `IN`.
    #[must_use]
    pub const fn qclass(&self) -> &str {
        self.qclass.as_str()
    }

    /// Query type such as `A`, `SOA` or `ANY`.
    #[must_use]
    pub const fn qtype(&self) -> &str {
        self.qtype.as_str()
    }

    /// Opaque request id to echo in answers.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Address of the client that asked the resolver.
    #[must_use]
    pub const fn remote_ip(&self) -> &str {
        self.remote_ip.as_str()
    }

    /// Local address the question arrived on; only sent under version 2.
    #[must_use]
    pub fn local_ip(&self) -> Option<&str> {
        self.local_ip.as_deref()
    }
}

/// A zone transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxfrRequest {
    soa_resource: String,
}

impl AxfrRequest {
    /// Builds a request from `AXFR` arguments; exactly one is required.
    #[must_use]
    pub fn from_args(args: &[&str]) -> Option<Self> {
        match args {
            [soa_resource] => Some(Self {
                soa_resource: (*soa_resource).to_owned(),
            }),
            _ => None,
        }
    }

    /// Opaque identifier of the zone to transfer.
    #[must_use]
    pub const fn soa_resource(&self) -> &str {
        self.soa_resource.as_str()
    }
}

/// Class used by [`Answer::new`] when none is given.
pub const DEFAULT_ANSWER_CLASS: &str = "IN";

/// TTL used by [`Answer::new`] when none is given.
pub const DEFAULT_ANSWER_TTL: u32 = 3600;

/// Id used by [`Answer::new`] when the answer is not tied to a query.
pub const DEFAULT_ANSWER_ID: &str = "-1";

/// One resource record sent back in a `DATA` line.
///
/// Columns follow the pipe backend order:
/// `qname qclass qtype ttl id content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    qname: String,
    qclass: String,
    qtype: String,
    ttl: u32,
    id: String,
    content: String,
}

impl Answer {
    /// Creates an answer with the default class, TTL and id.
    #[must_use]
    pub fn new(
        qname: impl Into<String>,
        qtype: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            qname: qname.into(),
            qclass: DEFAULT_ANSWER_CLASS.to_owned(),
            qtype: qtype.into(),
            ttl: DEFAULT_ANSWER_TTL,
            id: DEFAULT_ANSWER_ID.to_owned(),
            content: content.into(),
        }
    }

    /// Creates an answer that echoes the name, class and id of `query`.
    #[must_use]
    pub fn for_query(query: &Query, qtype: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            qname: query.qname().to_owned(),
            qclass: query.qclass().to_owned(),
            qtype: qtype.into(),
            ttl: DEFAULT_ANSWER_TTL,
            id: query.id().to_owned(),
            content: content.into(),
        }
    }

    /// Replaces the TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the class.
    #[must_use]
    pub fn with_class(mut self, qclass: impl Into<String>) -> Self {
        self.qclass = qclass.into();
        self
    }

    /// Replaces the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Record TTL in seconds.
    #[must_use]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Record content, e.g. an address or an SOA rdata string.
    #[must_use]
    pub const fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Renders the `DATA` columns in wire order.
    #[must_use]
    pub fn columns(&self) -> [String; 6] {
        [
            self.qname.clone(),
            self.qclass.clone(),
            self.qtype.clone(),
            self.ttl.to_string(),
            self.id.clone(),
            self.content.clone(),
        ]
    }
}
