//! Splits the inbound byte stream into request lines.
//!
//! The framer only ever yields complete lines. Bytes after the last newline
//! at end of input are dropped, and a read failure ends the sequence the same
//! way end of input does: the resolver has gone away, which is not a protocol
//! error.

use std::io::{self, BufRead};

use tracing::debug;

/// Tracing target for framing events.
const FRAMER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::framer");

/// One framed unit of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete line with its terminator (and any trailing `\r`) removed.
    Line(String),
    /// A line longer than the configured limit. Its bytes were discarded up
    /// to and including the terminator.
    Oversized {
        /// Length of the discarded line in bytes, terminator excluded.
        length: usize,
    },
}

/// Lazy sequence of [`Frame`]s read from a buffered source.
#[derive(Debug)]
pub struct LineFramer<R> {
    reader: R,
    max_line_bytes: usize,
    finished: bool,
}

impl<R: BufRead> LineFramer<R> {
    /// Frames `reader`, flagging lines longer than `max_line_bytes`.
    #[must_use]
    pub const fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            finished: false,
        }
    }

    /// Line limit in bytes.
    #[must_use]
    pub const fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    fn read_frame(&mut self) -> io::Result<Option<Frame>> {
        let mut buffer = Vec::new();
        let mut length = 0_usize;

        loop {
            let (consumed, complete) = {
                let available = match self.reader.fill_buf() {
                    Ok(available) => available,
                    Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                    Err(error) => return Err(error),
                };

                if available.is_empty() {
                    if length > 0 {
                        debug!(
                            target: FRAMER_TARGET,
                            discarded = length,
                            "input ended inside a line"
                        );
                    }
                    return Ok(None);
                }

                let newline = available.iter().position(|byte| *byte == b'\n');
                let (content, _) = available.split_at(newline.unwrap_or(available.len()));
                length += content.len();
                if length <= self.max_line_bytes {
                    buffer.extend_from_slice(content);
                }
                (
                    newline.map_or(content.len(), |position| position + 1),
                    newline.is_some(),
                )
            };

            self.reader.consume(consumed);
            if complete {
                return Ok(Some(self.finish_line(buffer, length)));
            }
        }
    }

    fn finish_line(&self, mut buffer: Vec<u8>, length: usize) -> Frame {
        if length > self.max_line_bytes {
            debug!(
                target: FRAMER_TARGET,
                length,
                limit = self.max_line_bytes,
                "discarded oversized line"
            );
            return Frame::Oversized { length };
        }

        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }
        Frame::Line(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl<R: BufRead> Iterator for LineFramer<R> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_frame() {
            Ok(Some(frame)) => Some(frame),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                debug!(target: FRAMER_TARGET, %error, "read failed; ending input");
                self.finished = true;
                None
            }
        }
    }
}
