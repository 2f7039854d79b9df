//! Connection loop tying the framer, dispatcher and output encoder together.
//!
//! A [`Session`] serves one pipe connection: it frames lines from the reader,
//! runs one turn per line and writes the responses in request order. The loop
//! ends cleanly when input ends; backend faults either end it or are logged
//! and skipped, depending on the configured [`FaultPolicy`].

use std::io::{BufRead, Write};

use pdns_pipe_config::{Config, FaultPolicy, default_fault_policy, default_max_line_bytes};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::dispatch::{Dispatcher, ProtocolError, TurnOutcome};
use crate::framer::{Frame, LineFramer};
use crate::output::ResponseWriter;

/// Tracing target for session lifecycle events.
const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Tunables for a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Longest inbound line accepted, in bytes.
    pub max_line_bytes: usize,
    /// What to do after a backend fault has been reported.
    pub fault_policy: FaultPolicy,
}

impl SessionOptions {
    /// Extracts the session tunables from resolved configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            max_line_bytes: config.max_line_bytes(),
            fault_policy: config.fault_policy(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_line_bytes: default_max_line_bytes(),
            fault_policy: default_fault_policy(),
        }
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Turns run, one per framed line.
    pub turns: u64,
    /// Turns refused before reaching the backend.
    pub rejected: u64,
    /// Backend faults reported on the wire.
    pub faults: u64,
}

/// Reasons a session stopped before its input ended.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A backend fault was escalated under [`FaultPolicy::Escalate`].
    #[error("backend fault escalated after {turns} turns: {source}")]
    Fault {
        /// Turns run, including the faulting one.
        turns: u64,
        /// The reported fault.
        #[source]
        source: ProtocolError,
    },

    /// The response sink failed.
    #[error("response sink failed after {turns} turns: {source}")]
    Output {
        /// Turns run, including the failing one.
        turns: u64,
        /// The sink failure.
        #[source]
        source: ProtocolError,
    },
}

impl SessionError {
    /// The fault that ended the session.
    #[must_use]
    pub const fn protocol_error(&self) -> &ProtocolError {
        match self {
            Self::Fault { source, .. } | Self::Output { source, .. } => source,
        }
    }
}

/// One pipe connection served by a [`Backend`].
#[derive(Debug)]
pub struct Session<B> {
    dispatcher: Dispatcher<B>,
    options: SessionOptions,
}

impl<B: Backend> Session<B> {
    /// Creates a session that has not negotiated a version yet.
    #[must_use]
    pub const fn new(backend: B, options: SessionOptions) -> Self {
        Self {
            dispatcher: Dispatcher::new(backend),
            options,
        }
    }

    /// Borrows the dispatcher, e.g. to inspect the negotiated version.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher<B> {
        &self.dispatcher
    }

    /// Consumes the session, returning the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.dispatcher.into_backend()
    }

    /// Serves requests from `reader` until it ends, answering on `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Fault`] when a backend fault is escalated and
    /// [`SessionError::Output`] when `writer` fails.
    pub fn serve<R, W>(&mut self, reader: R, writer: W) -> Result<SessionSummary, SessionError>
    where
        R: BufRead,
        W: Write,
    {
        let mut summary = SessionSummary::default();
        let mut sink = ResponseWriter::new(writer);
        let framer = LineFramer::new(reader, self.options.max_line_bytes);
        debug!(
            target: SESSION_TARGET,
            max_line_bytes = self.options.max_line_bytes,
            fault_policy = %self.options.fault_policy,
            "session started"
        );

        for frame in framer {
            summary.turns += 1;
            let result = match frame {
                Frame::Line(line) => self.dispatcher.dispatch_line(&line, &mut sink),
                Frame::Oversized { length } => self.dispatcher.reject_oversized(
                    length,
                    self.options.max_line_bytes,
                    &mut sink,
                ),
            };

            match result {
                Ok(TurnOutcome::Answered) => {}
                Ok(TurnOutcome::Rejected(_)) => summary.rejected += 1,
                Err(error) if error.is_backend_fault() => {
                    summary.faults += 1;
                    if self.options.fault_policy.escalates() {
                        return Err(SessionError::Fault {
                            turns: summary.turns,
                            source: error,
                        });
                    }
                    warn!(target: SESSION_TARGET, %error, "backend fault reported; continuing");
                }
                Err(error) => {
                    return Err(SessionError::Output {
                        turns: summary.turns,
                        source: error,
                    });
                }
            }
        }

        info!(
            target: SESSION_TARGET,
            turns = summary.turns,
            rejected = summary.rejected,
            faults = summary.faults,
            "input ended; session finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use rstest::rstest;

    use super::*;
    use crate::backend::{DefaultBackend, HookResult};
    use crate::output::Responder;

    /// Backend whose ping hook always fails.
    #[derive(Debug, Default)]
    struct FailingPing;

    impl Backend for FailingPing {
        fn ping(&mut self, _out: &mut dyn Responder) -> HookResult {
            Err("ping handler crashed".into())
        }
    }

    fn serve<B: Backend>(
        backend: B,
        options: SessionOptions,
        input: &str,
    ) -> (Result<SessionSummary, SessionError>, String) {
        let mut output = Vec::new();
        let mut session = Session::new(backend, options);
        let result = session.serve(Cursor::new(input.as_bytes().to_vec()), &mut output);
        (result, String::from_utf8(output).expect("utf8 output"))
    }

    fn options(fault_policy: FaultPolicy) -> SessionOptions {
        SessionOptions {
            fault_policy,
            ..SessionOptions::default()
        }
    }

    #[test]
    fn serves_until_input_ends() {
        let (result, output) = serve(
            DefaultBackend,
            SessionOptions::default(),
            "HELO\t2\nPING\nBOGUS\n",
        );
        assert_eq!(
            output,
            "OK\tBackend starting version 2.\nEND\nLOG\tUnknown Question: \"BOGUS\"\nFAIL\n"
        );
        assert_eq!(
            result.expect("session ends cleanly"),
            SessionSummary {
                turns: 3,
                rejected: 1,
                faults: 0
            }
        );
    }

    #[test]
    fn escalates_first_fault_after_reporting_it() {
        let (result, output) = serve(
            FailingPing,
            options(FaultPolicy::Escalate),
            "PING\nPING\n",
        );
        assert_eq!(
            output,
            "LOG\tAn unexpected error occurred in backend: ping handler crashed\nFAIL\n"
        );
        let error = result.expect_err("fault escalates");
        assert!(matches!(error, SessionError::Fault { turns: 1, .. }));
        assert_eq!(error.protocol_error().line(), "PING");
    }

    #[test]
    fn continue_policy_keeps_serving() {
        let (result, output) = serve(
            FailingPing,
            options(FaultPolicy::Continue),
            "PING\nPING\n",
        );
        assert_eq!(output.matches("FAIL\n").count(), 2);
        assert_eq!(
            result.expect("session ends cleanly"),
            SessionSummary {
                turns: 2,
                rejected: 0,
                faults: 2
            }
        );
    }

    #[test]
    fn oversized_line_takes_one_turn() {
        let options = SessionOptions {
            max_line_bytes: 8,
            ..SessionOptions::default()
        };
        let (result, output) = serve(DefaultBackend, options, "AXFR\tvery-long-zone\nPING\n");
        assert_eq!(
            output,
            "LOG\tReceived oversized line: 19 bytes exceeds 8 byte limit\nFAIL\nEND\n"
        );
        assert_eq!(result.expect("session ends cleanly").turns, 2);
    }

    #[rstest]
    #[case::empty("")]
    #[case::partial_line("HELO\t2")]
    fn no_complete_line_means_no_turns(#[case] input: &str) {
        let (result, output) = serve(DefaultBackend, SessionOptions::default(), input);
        assert!(output.is_empty());
        assert_eq!(result.expect("session ends cleanly").turns, 0);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "resolver went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failure_ends_session() {
        let mut session = Session::new(DefaultBackend, options(FaultPolicy::Continue));
        let error = session
            .serve(Cursor::new(b"PING\nPING\n".to_vec()), ClosedPipe)
            .expect_err("sink is closed");
        assert!(matches!(error, SessionError::Output { turns: 1, .. }));
    }

    #[test]
    fn options_follow_configuration() {
        let config = Config {
            max_line_bytes: 512,
            fault_policy: FaultPolicy::Continue,
            ..Config::default()
        };
        assert_eq!(
            SessionOptions::from_config(&config),
            SessionOptions {
                max_line_bytes: 512,
                fault_policy: FaultPolicy::Continue
            }
        );
    }
}
