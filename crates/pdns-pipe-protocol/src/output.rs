//! Response framing for the resolver side of the pipe.
//!
//! A turn is answered with any number of `DATA` and `LOG` frames followed by
//! exactly one terminal frame (`OK`, `END` or `FAIL`). The [`Responder`] trait
//! exposes those intents; [`ResponseWriter`] encodes them onto a byte sink.
//! Backends only ever see `&mut dyn Responder`, so tests can swap the sink for
//! an in-memory buffer or a recording double.

use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

use crate::fields::SEPARATOR;
use crate::records::Answer;

/// Tag leading every response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseTag {
    /// Handshake accepted.
    Ok,
    /// One answer record.
    Data,
    /// Diagnostic text; does not end the turn.
    Log,
    /// The turn failed.
    Fail,
    /// The turn succeeded with no further data.
    End,
}

impl ResponseTag {
    /// Wire spelling of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Data => "DATA",
            Self::Log => "LOG",
            Self::Fail => "FAIL",
            Self::End => "END",
        }
    }

    /// Whether the frame closes the turn.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ok | Self::Fail | Self::End)
    }
}

impl fmt::Display for ResponseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while emitting response frames.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Writing to or flushing the sink failed.
    #[error("failed to write response frame: {0}")]
    Io(#[from] io::Error),

    /// A field would break framing on the resolver side.
    #[error("response field {field:?} contains a tab or line break")]
    InvalidField {
        /// Offending field value.
        field: String,
    },

    /// A frame was written after the turn had already been terminated.
    #[error("turn already terminated; cannot write {tag} frame")]
    TurnClosed {
        /// Tag of the rejected frame.
        tag: ResponseTag,
    },
}

/// Sink for the frames of one turn.
///
/// Only [`Responder::send_frame`] is required; the remaining methods are the
/// intents backends use to answer.
pub trait Responder {
    /// Writes one frame made of `tag` followed by `fields`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is not encodable or the sink fails.
    fn send_frame(&mut self, tag: ResponseTag, fields: &[&str]) -> Result<(), OutputError>;

    /// Accepts a handshake with a human-readable banner.
    ///
    /// # Errors
    ///
    /// Propagates [`Responder::send_frame`] failures.
    fn ok(&mut self, message: &str) -> Result<(), OutputError> {
        self.send_frame(ResponseTag::Ok, &[message])
    }

    /// Emits one answer record as raw columns.
    ///
    /// # Errors
    ///
    /// Propagates [`Responder::send_frame`] failures.
    fn data(&mut self, fields: &[&str]) -> Result<(), OutputError> {
        self.send_frame(ResponseTag::Data, fields)
    }

    /// Emits one typed answer record.
    ///
    /// # Errors
    ///
    /// Propagates [`Responder::send_frame`] failures.
    fn answer(&mut self, answer: &Answer) -> Result<(), OutputError> {
        let columns = answer.columns();
        let fields: Vec<&str> = columns.iter().map(String::as_str).collect();
        self.data(&fields)
    }

    /// Emits a diagnostic line without ending the turn.
    ///
    /// # Errors
    ///
    /// Propagates [`Responder::send_frame`] failures.
    fn log(&mut self, message: &str) -> Result<(), OutputError> {
        self.send_frame(ResponseTag::Log, &[message])
    }

    /// Ends the turn as failed, logging `message` first when given.
    ///
    /// # Errors
    ///
    /// Propagates [`Responder::send_frame`] failures.
    fn fail(&mut self, message: Option<&str>) -> Result<(), OutputError> {
        if let Some(text) = message {
            self.log(text)?;
        }
        self.send_frame(ResponseTag::Fail, &[])
    }

    /// Ends the turn successfully, logging `message` first when given.
    ///
    /// # Errors
    ///
    /// Propagates [`Responder::send_frame`] failures.
    fn done(&mut self, message: Option<&str>) -> Result<(), OutputError> {
        if let Some(text) = message {
            self.log(text)?;
        }
        self.send_frame(ResponseTag::End, &[])
    }
}

/// Encodes frames as tab-separated, newline-terminated lines.
///
/// The sink is flushed after every terminal frame so the resolver is never
/// left waiting on buffered output.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Wraps an output stream.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped stream.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Borrows the wrapped stream.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> Responder for ResponseWriter<W> {
    fn send_frame(&mut self, tag: ResponseTag, fields: &[&str]) -> Result<(), OutputError> {
        let frame = encode_frame(tag, fields)?;
        self.writer.write_all(frame.as_bytes())?;
        if tag.is_terminal() {
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// Builds the wire form of one frame, newline included.
///
/// # Errors
///
/// Returns [`OutputError::InvalidField`] if a field contains a tab, carriage
/// return or newline.
pub fn encode_frame(tag: ResponseTag, fields: &[&str]) -> Result<String, OutputError> {
    let mut frame = String::from(tag.as_str());
    for field in fields {
        if field.contains([SEPARATOR, '\r', '\n']) {
            return Err(OutputError::InvalidField {
                field: (*field).to_owned(),
            });
        }
        frame.push(SEPARATOR);
        frame.push_str(field);
    }
    frame.push('\n');
    Ok(frame)
}
