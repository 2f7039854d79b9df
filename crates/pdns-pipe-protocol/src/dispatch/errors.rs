//! Failure taxonomy for a single turn.
//!
//! Two kinds of failure end a turn with `FAIL`:
//!
//! - a [`Rejection`] is a disagreement about the request itself (unknown tag,
//!   wrong arity, unsupported version). It is reported on the wire and the
//!   session carries on.
//! - a [`ProtocolError`] is a fault in the backend or the sink. Faults are
//!   reported on the wire when the sink still works and are then returned to
//!   the caller so the host can escalate them.

use thiserror::Error;

use crate::backend::HookError;
use crate::output::OutputError;

/// A request the engine refused to hand to the backend.
///
/// The display text is the diagnostic sent in the `LOG` frame preceding
/// `FAIL`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// `HELO` without a supported version number.
    #[error("Received unexpected handshake: {args:?}")]
    Handshake {
        /// Raw `HELO` arguments.
        args: Vec<String>,
    },

    /// `Q` arrived before any handshake fixed the version.
    #[error("Received Q before handshake: {args:?}")]
    QueryBeforeHandshake {
        /// Raw `Q` arguments.
        args: Vec<String>,
    },

    /// `Q` with the wrong number of fields for the negotiated version.
    #[error("Received unexpected format for Q: {args:?}")]
    QueryFormat {
        /// Raw `Q` arguments.
        args: Vec<String>,
    },

    /// `AXFR` without exactly one argument.
    #[error("Received unexpected format for AXFR: {args:?}")]
    AxfrFormat {
        /// Raw `AXFR` arguments.
        args: Vec<String>,
    },

    /// A tag outside the command table.
    #[error("Unknown Question: {line:?}")]
    UnknownQuestion {
        /// The full raw line.
        line: String,
    },

    /// A line longer than the framer accepts.
    #[error("Received oversized line: {length} bytes exceeds {limit} byte limit")]
    Oversized {
        /// Length of the discarded line.
        length: usize,
        /// Configured limit.
        limit: usize,
    },
}

/// A fault raised while a turn was in progress.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A backend hook returned an error.
    #[error("backend failed while answering {line:?}: {source}")]
    Hook {
        /// Raw request line.
        line: String,
        /// Error returned by the hook.
        #[source]
        source: HookError,
    },

    /// A backend hook returned without writing a terminal frame.
    #[error("backend returned without completing the turn for {line:?}")]
    Unterminated {
        /// Raw request line.
        line: String,
    },

    /// The response sink failed, so nothing could be reported on the wire.
    #[error("failed to answer {line:?}: {source}")]
    Output {
        /// Raw request line.
        line: String,
        /// Underlying sink error.
        #[source]
        source: OutputError,
    },
}

impl ProtocolError {
    /// Raw request line the fault belongs to.
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::Hook { line, .. } | Self::Unterminated { line } | Self::Output { line, .. } => {
                line
            }
        }
    }

    /// Whether the fault came from backend logic rather than the sink.
    ///
    /// Backend faults have already been reported with `FAIL`; sink faults
    /// mean the pipe itself is unusable.
    #[must_use]
    pub const fn is_backend_fault(&self) -> bool {
        matches!(self, Self::Hook { .. } | Self::Unterminated { .. })
    }

    /// Diagnostic sent in the `LOG` frame that reports this fault.
    #[must_use]
    pub fn wire_message(&self) -> String {
        match self {
            Self::Hook { source, .. } => format!(
                "An unexpected error occurred in backend: {}",
                single_line(&source.to_string())
            ),
            Self::Unterminated { .. } => {
                String::from("An unexpected error occurred in backend: turn was not completed")
            }
            Self::Output { source, .. } => single_line(&source.to_string()),
        }
    }
}

/// Flattens arbitrary text into something a single frame field can carry.
pub(crate) fn single_line(text: &str) -> String {
    text.chars()
        .map(|character| match character {
            '\t' | '\r' | '\n' => ' ',
            other => other,
        })
        .collect()
}
