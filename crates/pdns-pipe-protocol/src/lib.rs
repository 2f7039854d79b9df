//! PowerDNS pipe backend protocol engine.
//!
//! The resolver spawns the backend process and talks to it over standard
//! input and output, one tab-separated line per request. Every request line is
//! answered by exactly one *turn*: any number of `DATA` and `LOG` lines
//! followed by a single terminal `OK`, `END` or `FAIL` line.
//!
//! # Architecture
//!
//! Input flows through the [`LineFramer`] (complete lines only), the
//! [`DecodedLine`] field decoder, and the [`Dispatcher`], which validates the
//! request against the negotiated [`ProtocolVersion`] and invokes the
//! integrator's [`Backend`] hooks. Hooks answer through the [`Responder`]
//! trait; [`ResponseWriter`] encodes those frames onto the output stream.
//! [`Session`] runs that loop over a whole connection.
//!
//! Request validation failures are answered with `FAIL` and the session goes
//! on. Backend faults are answered with `FAIL` too and are then handed back to
//! the caller as a [`ProtocolError`] so the host process can escalate them.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::io;
//!
//! use pdns_pipe_protocol::{
//!     Answer, Backend, HookResult, Query, Responder, Session, SessionOptions,
//! };
//!
//! struct Static;
//!
//! impl Backend for Static {
//!     fn query(&mut self, query: &Query, out: &mut dyn Responder) -> HookResult {
//!         if query.qname() == "example.org" {
//!             out.answer(&Answer::for_query(query, "A", "192.0.2.10"))?;
//!         }
//!         out.done(None)?;
//!         Ok(())
//!     }
//! }
//!
//! let mut session = Session::new(Static, SessionOptions::default());
//! let summary = session
//!     .serve(io::stdin().lock(), io::stdout().lock())
//!     .expect("session ends cleanly");
//! eprintln!("served {} turns", summary.turns);
//! ```

pub mod backend;
pub mod dispatch;
pub mod fields;
pub mod framer;
pub mod output;
pub mod records;
pub mod session;

#[cfg(test)]
mod tests;

pub use self::backend::{Backend, DefaultBackend, HookError, HookResult, handshake_banner};
pub use self::dispatch::{Dispatcher, ProtocolError, Rejection, TurnOutcome};
pub use self::fields::{CommandKind, DecodedLine, SEPARATOR};
pub use self::framer::{Frame, LineFramer};
pub use self::output::{OutputError, Responder, ResponseTag, ResponseWriter, encode_frame};
pub use self::records::{Answer, AxfrRequest, ProtocolVersion, Query};
pub use self::session::{Session, SessionError, SessionOptions, SessionSummary};
