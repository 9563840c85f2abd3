//! SMTP reply framing.
//!
//! Replies are single-line or multi-line:
//! - Single: `250 OK\r\n`
//! - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
//!
//! [`ReplyParser`] is a small state machine fed with raw bytes from the
//! socket. Bytes accumulate until a line terminator arrives, each complete
//! line is checked for the `-` continuation marker, and a [`Reply`] is
//! emitted once a final line has been seen. It performs no I/O, so framing
//! can be tested against crafted fixtures without a socket.

use bytes::BytesMut;

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Longest reply line accepted before giving up on the peer.
pub const MAX_LINE_LENGTH: usize = 4096;

/// How a complete reply line relates to the reply it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `NNN-text`: more lines follow.
    Continuation,
    /// `NNN text` or bare `NNN`: the reply is complete.
    Final,
}

/// Classifies one reply line (without its terminator).
///
/// # Errors
///
/// Returns an error if the line does not start with a three digit code.
pub fn classify_line(line: &str) -> Result<LineKind> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(Error::Protocol(format!("Malformed reply line: {line:?}")));
    }

    match bytes.get(3) {
        Some(b'-') => Ok(LineKind::Continuation),
        _ => Ok(LineKind::Final),
    }
}

/// Incremental reply parser.
#[derive(Debug, Default)]
pub struct ReplyParser {
    /// Bytes received but not yet terminated by a newline.
    buffer: BytesMut,
    /// Lines of the reply currently being assembled.
    pending: Vec<String>,
}

impl ReplyParser {
    /// Creates an empty parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes read from the connection.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Returns the next complete reply, or `None` if more input is needed.
    ///
    /// # Errors
    ///
    /// Returns an error on a malformed or oversized line.
    pub fn next_reply(&mut self) -> Result<Option<Reply>> {
        while let Some(line) = self.take_line()? {
            // Tolerate stray blank lines between replies
            if line.is_empty() {
                continue;
            }

            let kind = classify_line(&line)?;
            self.pending.push(line);

            if kind == LineKind::Final {
                return self.finish().map(Some);
            }
        }

        Ok(None)
    }

    /// Returns true if bytes or partial reply lines are buffered.
    #[must_use]
    pub fn has_buffered(&self) -> bool {
        !self.buffer.is_empty() || !self.pending.is_empty()
    }

    /// Drops everything buffered.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending.clear();
    }

    fn take_line(&mut self) -> Result<Option<String>> {
        let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') else {
            if self.buffer.len() > MAX_LINE_LENGTH {
                self.clear();
                return Err(Error::Protocol("Reply line too long".into()));
            }
            return Ok(None);
        };

        if pos > MAX_LINE_LENGTH {
            self.clear();
            return Err(Error::Protocol("Reply line too long".into()));
        }

        let raw = self.buffer.split_to(pos + 1);
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn finish(&mut self) -> Result<Reply> {
        let lines = std::mem::take(&mut self.pending);

        // The final line decides the code
        let last = lines.last().map_or("", String::as_str);
        let code = last
            .get(..3)
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| Error::Protocol(format!("Invalid reply code: {last:?}")))?;

        let text = lines
            .iter()
            .map(|line| line.get(4..).unwrap_or_default().to_string())
            .collect();

        Ok(Reply::new(ReplyCode::new(code), text))
    }
}
