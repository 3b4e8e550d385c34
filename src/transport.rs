//! Serial line transport
//!
//! Turns the byte-oriented modem UART into a line-oriented port the
//! command engine and event dispatcher share. Implementations own all
//! waiting: timeouts are passed into the read primitives rather than
//! scattered as fixed delays at call sites.

use heapless::String;

use crate::config::{DECODE_PLACEHOLDER, LINE_BUFFER_SIZE};

/// One decoded, trimmed reply line from the modem
pub type Line = String<LINE_BUFFER_SIZE>;

/// Text decoding policy for incoming lines
///
/// The SIM800L occasionally delivers line noise or partial transmissions
/// containing non-text bytes. `Replace` substitutes each byte above 127
/// with [`DECODE_PLACEHOLDER`] so decoding never fails; the information in
/// those bytes is lost, which is acceptable for status lines. `Strict`
/// rejects such lines outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Replace non-text bytes with a placeholder, never fail
    #[default]
    Replace,
    /// Reject lines containing non-text bytes
    Strict,
}

/// Decode a raw line according to the given policy
///
/// Trims leading and trailing whitespace (including the `\r\n` framing).
/// Bytes beyond the line buffer capacity are dropped.
#[must_use]
pub fn decode_line(raw: &[u8], policy: DecodePolicy) -> Option<Line> {
    let mut decoded = Line::new();
    for &byte in raw {
        let ch = if byte > 127 {
            match policy {
                DecodePolicy::Replace => DECODE_PLACEHOLDER,
                DecodePolicy::Strict => return None,
            }
        } else {
            byte as char
        };
        let _ = decoded.push(ch);
    }

    let trimmed = decoded.trim();
    let mut line = Line::new();
    let _ = line.push_str(trimmed);
    Some(line)
}

/// Byte-stream port carrying the modem's command/reply traffic
///
/// The receive buffer is effectively owned by the command engine while a
/// command is outstanding and by the unsolicited dispatcher otherwise;
/// [`LinePort::discard_input`] before each command is the hand-over point.
pub trait LinePort {
    /// Write raw bytes to the modem
    fn write(&mut self, bytes: &[u8]);

    /// Read one line, blocking up to `timeout_ms`
    ///
    /// Returns `None` on timeout or an empty read. The returned line is
    /// decoded and trimmed per the port's [`DecodePolicy`].
    fn read_line(&mut self, timeout_ms: u32) -> Option<Line>;

    /// Read up to `buf.len()` raw bytes, blocking up to `timeout_ms`
    ///
    /// Returns the number of bytes actually read. Used for bulk payloads
    /// (HTTP bodies) that are not line-framed.
    fn read_bytes(&mut self, buf: &mut [u8], timeout_ms: u32) -> usize;

    /// Check whether any received bytes are waiting
    fn bytes_available(&mut self) -> bool;

    /// Drop everything currently buffered on the receive side
    fn discard_input(&mut self);

    /// Pause for `ms` milliseconds (pacing between commands)
    fn delay_ms(&mut self, ms: u32);
}

/// Scripted in-memory port for host-side tests and bring-up
///
/// Replies are queued as raw chunks; each [`LinePort::read_line`] consumes
/// one chunk, each [`LinePort::read_bytes`] drains from the front. Written
/// bytes and requested delays are recorded for inspection.
#[cfg(feature = "std")]
pub struct ScriptedPort {
    /// Already-arrived input, removed by [`LinePort::discard_input`]
    stale: std::collections::VecDeque<Vec<u8>>,
    /// Future replies, untouched by a flush
    rx: std::collections::VecDeque<Vec<u8>>,
    /// Everything written to the port, in order
    pub tx: Vec<u8>,
    /// Delays requested through [`LinePort::delay_ms`], in order
    pub delays: Vec<u32>,
    policy: DecodePolicy,
}

#[cfg(feature = "std")]
impl ScriptedPort {
    /// Create an empty port with the default (lossy) decode policy
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(DecodePolicy::Replace)
    }

    /// Create an empty port with an explicit decode policy
    #[must_use]
    pub fn with_policy(policy: DecodePolicy) -> Self {
        Self {
            stale: std::collections::VecDeque::new(),
            rx: std::collections::VecDeque::new(),
            tx: Vec::new(),
            delays: Vec::new(),
            policy,
        }
    }

    /// Queue one reply line (raw, without framing)
    pub fn push_line(&mut self, line: &str) {
        self.rx.push_back(line.as_bytes().to_vec());
    }

    /// Queue one raw reply chunk
    pub fn push_raw(&mut self, chunk: &[u8]) {
        self.rx.push_back(chunk.to_vec());
    }

    /// Queue input that has already arrived and is subject to a flush
    pub fn push_stale_line(&mut self, line: &str) {
        self.stale.push_back(line.as_bytes().to_vec());
    }

    /// Everything written so far, lossily decoded for assertions
    #[must_use]
    pub fn transcript(&self) -> std::string::String {
        std::string::String::from_utf8_lossy(&self.tx).into_owned()
    }
}

#[cfg(feature = "std")]
impl Default for ScriptedPort {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl LinePort for ScriptedPort {
    fn write(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
    }

    fn read_line(&mut self, _timeout_ms: u32) -> Option<Line> {
        let chunk = self.stale.pop_front().or_else(|| self.rx.pop_front())?;
        decode_line(&chunk, self.policy)
    }

    fn read_bytes(&mut self, buf: &mut [u8], _timeout_ms: u32) -> usize {
        let filled = drain_chunks(&mut self.stale, buf);
        filled + drain_chunks(&mut self.rx, &mut buf[filled..])
    }

    fn bytes_available(&mut self) -> bool {
        !self.stale.is_empty() || !self.rx.is_empty()
    }

    fn discard_input(&mut self) {
        self.stale.clear();
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }
}

/// Copy as many queued bytes as fit into `buf`, consuming spent chunks
#[cfg(feature = "std")]
fn drain_chunks(queue: &mut std::collections::VecDeque<Vec<u8>>, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        let Some(front) = queue.front_mut() else {
            break;
        };
        let take = front.len().min(buf.len() - filled);
        buf[filled..filled + take].copy_from_slice(&front[..take]);
        front.drain(..take);
        if front.is_empty() {
            queue.pop_front();
        }
        filled += take;
    }
    filled
}
