//! Turn dispatch for decoded request lines.
//!
//! [`Dispatcher`] owns the only state that outlives a turn, the negotiated
//! [`ProtocolVersion`], and the integrator's [`Backend`]. Every line handed to
//! [`Dispatcher::dispatch_line`] produces exactly one turn on the sink:
//! validation failures end it with `LOG` + `FAIL` and are returned as
//! [`TurnOutcome::Rejected`]; backend faults are also reported with `FAIL` and
//! then returned as [`ProtocolError`] so the host decides whether to carry on.

mod errors;
mod turn;


use tracing::{debug, warn};

pub use self::errors::{ProtocolError, Rejection};

use self::errors::single_line;
use self::turn::TurnGuard;
use crate::backend::{Backend, HookError, HookResult};
use crate::fields::{CommandKind, DecodedLine};
use crate::output::{OutputError, Responder};
use crate::records::{AxfrRequest, ProtocolVersion, Query};

/// Tracing target for dispatch events.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// How a turn ended when no fault occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The request reached the backend, which closed the turn itself.
    Answered,
    /// The request was refused before reaching the backend.
    Rejected(Rejection),
}

/// What a command handler decided before the turn is closed.
enum Step {
    Invoked(HookResult),
    Rejected(Rejection),
}

/// Routes request lines to a [`Backend`] and enforces the turn contract.
#[derive(Debug, Default)]
pub struct Dispatcher<B> {
    backend: B,
    version: Option<ProtocolVersion>,
}

impl<B: Backend> Dispatcher<B> {
    /// Creates a dispatcher awaiting its handshake.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            version: None,
        }
    }

    /// Version fixed by the most recent successful handshake.
    #[must_use]
    pub const fn version(&self) -> Option<ProtocolVersion> {
        self.version
    }

    /// Borrows the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the dispatcher, returning the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Runs one turn for `line`, which must have its terminator removed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Hook`] or [`ProtocolError::Unterminated`] after
    /// the fault has been reported with `FAIL`, and [`ProtocolError::Output`]
    /// when the sink itself failed.
    pub fn dispatch_line(
        &mut self,
        line: &str,
        sink: &mut dyn Responder,
    ) -> Result<TurnOutcome, ProtocolError> {
        let decoded = DecodedLine::decode(line);
        debug!(
            target: DISPATCH_TARGET,
            command = decoded.kind().tag().unwrap_or("unknown"),
            arguments = decoded.args().len(),
            "dispatching line"
        );

        let mut turn = TurnGuard::new(sink);
        let step = match decoded.kind() {
            CommandKind::Handshake => self.handshake(&decoded, &mut turn),
            CommandKind::Query => self.query(&decoded, &mut turn),
            CommandKind::AxfrRequest => self.axfr(&decoded, &mut turn),
            CommandKind::Ping => Step::Invoked(self.backend.ping(&mut turn)),
            CommandKind::Unknown => Step::Rejected(Rejection::UnknownQuestion {
                line: line.to_owned(),
            }),
        };

        match step {
            Step::Rejected(rejection) => reject(line, rejection, &mut turn),
            Step::Invoked(Ok(())) if turn.is_closed() => Ok(TurnOutcome::Answered),
            Step::Invoked(Ok(())) => Err(report_fault(
                ProtocolError::Unterminated {
                    line: line.to_owned(),
                },
                &mut turn,
            )),
            Step::Invoked(Err(source)) => Err(report_fault(hook_fault(line, source), &mut turn)),
        }
    }

    /// Runs the turn for a line the framer discarded for exceeding `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Output`] when the sink failed.
    pub fn reject_oversized(
        &mut self,
        length: usize,
        limit: usize,
        sink: &mut dyn Responder,
    ) -> Result<TurnOutcome, ProtocolError> {
        let mut turn = TurnGuard::new(sink);
        reject("", Rejection::Oversized { length, limit }, &mut turn)
    }

    fn handshake(&mut self, decoded: &DecodedLine<'_>, turn: &mut TurnGuard<'_>) -> Step {
        let requested = decoded
            .args()
            .first()
            .and_then(|argument| argument.parse::<u64>().ok())
            .and_then(ProtocolVersion::from_number);

        let Some(version) = requested else {
            return Step::Rejected(Rejection::Handshake {
                args: decoded.owned_args(),
            });
        };

        if let Some(previous) = self.version.replace(version) {
            warn!(
                target: DISPATCH_TARGET,
                %previous,
                %version,
                "handshake repeated; renegotiating protocol version"
            );
        } else {
            debug!(target: DISPATCH_TARGET, %version, "protocol version negotiated");
        }

        Step::Invoked(self.backend.handshake(version, turn))
    }

    fn query(&mut self, decoded: &DecodedLine<'_>, turn: &mut TurnGuard<'_>) -> Step {
        let Some(version) = self.version else {
            return Step::Rejected(Rejection::QueryBeforeHandshake {
                args: decoded.owned_args(),
            });
        };

        match Query::from_args(version, decoded.args()) {
            Some(query) => Step::Invoked(self.backend.query(&query, turn)),
            None => Step::Rejected(Rejection::QueryFormat {
                args: decoded.owned_args(),
            }),
        }
    }

    fn axfr(&mut self, decoded: &DecodedLine<'_>, turn: &mut TurnGuard<'_>) -> Step {
        match AxfrRequest::from_args(decoded.args()) {
            Some(request) => Step::Invoked(self.backend.axfr(&request, turn)),
            None => Step::Rejected(Rejection::AxfrFormat {
                args: decoded.owned_args(),
            }),
        }
    }
}

fn reject(
    line: &str,
    rejection: Rejection,
    turn: &mut TurnGuard<'_>,
) -> Result<TurnOutcome, ProtocolError> {
    debug!(target: DISPATCH_TARGET, reason = %rejection, "rejecting line");
    turn.fail(Some(&single_line(&rejection.to_string())))
        .map_err(|source| ProtocolError::Output {
            line: line.to_owned(),
            source,
        })?;
    Ok(TurnOutcome::Rejected(rejection))
}

/// Separates sink failures that surfaced through a hook from backend logic
/// failures.
fn hook_fault(line: &str, error: HookError) -> ProtocolError {
    match error.downcast::<OutputError>() {
        Ok(output) if matches!(*output, OutputError::Io(_)) => ProtocolError::Output {
            line: line.to_owned(),
            source: *output,
        },
        Ok(output) => ProtocolError::Hook {
            line: line.to_owned(),
            source: output,
        },
        Err(source) => ProtocolError::Hook {
            line: line.to_owned(),
            source,
        },
    }
}

/// Closes the turn with `FAIL` if it is still open, then hands the fault
/// back. A sink failure while reporting replaces the fault.
fn report_fault(error: ProtocolError, turn: &mut TurnGuard<'_>) -> ProtocolError {
    warn!(target: DISPATCH_TARGET, %error, "turn failed");
    if !error.is_backend_fault() || turn.is_closed() {
        return error;
    }

    match turn.fail(Some(&error.wire_message())) {
        Ok(()) => error,
        Err(source) => ProtocolError::Output {
            line: error.line().to_owned(),
            source,
        },
    }
}
