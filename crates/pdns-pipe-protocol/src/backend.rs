//! Extension points invoked by the dispatcher.
//!
//! A [`Backend`] answers decoded requests. Each hook receives the turn's
//! [`Responder`] and must finish the turn by writing exactly one terminal
//! frame (`ok`, `done` or `fail`). Every hook has a default, so an empty
//! implementation is a working backend that accepts the handshake and
//! answers everything else with `END`.

use std::error::Error;

use crate::output::Responder;
use crate::records::{AxfrRequest, ProtocolVersion, Query};

/// Failure raised by backend logic during a turn.
pub type HookError = Box<dyn Error + Send + Sync>;

/// Result returned by every hook.
pub type HookResult = Result<(), HookError>;

/// Banner sent when a handshake is accepted.
#[must_use]
pub fn handshake_banner(version: ProtocolVersion) -> String {
    format!("Backend starting version {version}.")
}

/// Integrator-supplied answering logic.
pub trait Backend {
    /// Called after a `HELO` naming a supported version.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to start. The version stays
    /// negotiated; the turn is failed and the fault is returned to the host.
    fn handshake(&mut self, version: ProtocolVersion, out: &mut dyn Responder) -> HookResult {
        out.ok(&handshake_banner(version))?;
        Ok(())
    }

    /// Called for each well-formed `Q` line.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    fn query(&mut self, query: &Query, out: &mut dyn Responder) -> HookResult {
        let _ = query;
        out.done(None)?;
        Ok(())
    }

    /// Called for each well-formed `AXFR` line.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer cannot be produced.
    fn axfr(&mut self, request: &AxfrRequest, out: &mut dyn Responder) -> HookResult {
        let _ = request;
        out.done(None)?;
        Ok(())
    }

    /// Called for each `PING` line.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend reports itself unhealthy.
    fn ping(&mut self, out: &mut dyn Responder) -> HookResult {
        out.done(None)?;
        Ok(())
    }
}

/// Backend that keeps every default: it has no data for anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBackend;

impl Backend for DefaultBackend {}

impl<B> Backend for Box<B>
where
    B: Backend + ?Sized,
{
    fn handshake(&mut self, version: ProtocolVersion, out: &mut dyn Responder) -> HookResult {
        (**self).handshake(version, out)
    }

    fn query(&mut self, query: &Query, out: &mut dyn Responder) -> HookResult {
        (**self).query(query, out)
    }

    fn axfr(&mut self, request: &AxfrRequest, out: &mut dyn Responder) -> HookResult {
        (**self).axfr(request, out)
    }

    fn ping(&mut self, out: &mut dyn Responder) -> HookResult {
        (**self).ping(out)
    }
}
