//! Per-turn wrapper that enforces a single terminal frame.

use crate::output::{OutputError, Responder, ResponseTag};

/// Borrowed sink that tracks whether the current turn has been closed.
///
/// Frames written after the terminal frame are refused with
/// [`OutputError::TurnClosed`] and never reach the sink.
pub(super) struct TurnGuard<'a> {
    sink: &'a mut dyn Responder,
    closed_by: Option<ResponseTag>,
}

impl<'a> TurnGuard<'a> {
    pub(super) fn new(sink: &'a mut dyn Responder) -> Self {
        Self {
            sink,
            closed_by: None,
        }
    }

    /// Whether a terminal frame has been written.
    pub(super) const fn is_closed(&self) -> bool {
        self.closed_by.is_some()
    }
}

impl Responder for TurnGuard<'_> {
    fn send_frame(&mut self, tag: ResponseTag, fields: &[&str]) -> Result<(), OutputError> {
        if self.closed_by.is_some() {
            return Err(OutputError::TurnClosed { tag });
        }
        self.sink.send_frame(tag, fields)?;
        if tag.is_terminal() {
            self.closed_by = Some(tag);
        }
        Ok(())
    }
}
