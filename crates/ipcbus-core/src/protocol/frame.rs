//! Frame encoding and incremental decoding (panic-free).
//!
//! Records are self-delimiting JSON values. Outbound records are followed by
//! a newline; inbound records may arrive back to back, split across reads,
//! or separated by arbitrary whitespace.
//!
//! Decoding rules:
//! - Never index the buffer; consume with `Buf::advance` after a parse.
//! - A syntax error resynchronises at the next newline, or drops the buffer.
//! - An incomplete record larger than `max_frame_bytes` is dropped.
//! - Chunks are scanned once for the record's closing bracket; serde only
//!   runs when a record can be complete, or on a newline with the attempt
//!   size doubling each time, so a record split into many reads decodes in
//!   linear time.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::Serialize;
use serde_json::Value;

use crate::error::{IpcBusError, Result};
use crate::protocol::envelope::Message;

/// Default upper bound for one buffered record (16 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Serialize one message into a newline-terminated frame.
pub fn encode<T: Serialize>(msg: &Message<T>) -> Result<Bytes> {
    let mut out = BytesMut::new().writer();
    serde_json::to_writer(&mut out, msg)
        .map_err(|e| IpcBusError::Internal(format!("json encode failed: {e}")))?;
    let mut out = out.into_inner();
    out.put_u8(b'\n');
    Ok(out.freeze())
}

/// Decode exactly one complete record.
pub fn decode(bytes: &[u8]) -> Result<Message> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| IpcBusError::MalformedMessage(format!("invalid json: {e}")))?;
    Message::from_value(value)
}

/// Incremental decoder for a byte stream of concatenated records.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: BytesMut,
    max_frame_bytes: usize,
    scan: Scan,
    #[cfg(test)]
    parses: usize,
}

/// Bracket/string state of the partial record at the front of the buffer.
#[derive(Debug, Default)]
struct Scan {
    pos: usize,
    depth: usize,
    in_str: bool,
    escaped: bool,
    /// Buffer length at the last newline-triggered parse.
    attempted: usize,
}

impl Scan {
    /// Scan bytes not yet seen and report whether a parse is worth trying.
    fn ready(&mut self, buf: &[u8]) -> bool {
        if self.pos == 0 && !matches!(buf.first(), Some(b'{' | b'[' | b'"')) {
            // scalars and garbage: let serde decide right away
            return true;
        }

        let mut newline = false;
        for (i, &b) in buf.iter().enumerate().skip(self.pos) {
            if b == b'\n' {
                newline = true;
            }
            if self.in_str {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_str = false;
                    if self.depth == 0 {
                        self.pos = i + 1;
                        return true;
                    }
                }
                continue;
            }
            match b {
                b'"' => self.in_str = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        self.pos = i + 1;
                        return true;
                    }
                }
                _ => {}
            }
        }
        self.pos = buf.len();

        if newline && buf.len() >= self.attempted.saturating_mul(2) {
            self.attempted = buf.len();
            return true;
        }
        false
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

enum Step {
    Record(Value, usize),
    Incomplete,
    Invalid(serde_json::Error),
}

impl FrameDecoder {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_frame_bytes,
            scan: Scan::default(),
            #[cfg(test)]
            parses: 0,
        }
    }

    /// Bytes buffered but not yet decoded.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Append a chunk and return every record it completes, in order.
    ///
    /// Each entry is either a well-formed message or the `MalformedMessage`
    /// error for a record that was dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<Message>> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();

        loop {
            let skip = self
                .buf
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            self.buf.advance(skip);
            if self.buf.is_empty() {
                break;
            }

            let step = if self.scan.ready(&self.buf) {
                self.step()
            } else {
                Step::Incomplete
            };

            match step {
                Step::Record(value, consumed) => {
                    self.buf.advance(consumed);
                    self.scan = Scan::default();
                    out.push(Message::from_value(value));
                }
                Step::Incomplete => {
                    if self.buf.len() > self.max_frame_bytes {
                        let dropped = self.buf.len();
                        self.buf.clear();
                        self.scan = Scan::default();
                        out.push(Err(IpcBusError::MalformedMessage(format!(
                            "frame exceeds {} bytes ({dropped} buffered)",
                            self.max_frame_bytes
                        ))));
                    }
                    break;
                }
                Step::Invalid(e) => {
                    self.resync();
                    out.push(Err(IpcBusError::MalformedMessage(format!(
                        "invalid json: {e}"
                    ))));
                }
            }
        }

        out
    }

    fn step(&mut self) -> Step {
        #[cfg(test)]
        {
            self.parses += 1;
        }
        let mut stream = serde_json::Deserializer::from_slice(&self.buf).into_iter::<Value>();
        match stream.next() {
            None => Step::Incomplete,
            Some(Ok(value)) => Step::Record(value, stream.byte_offset()),
            Some(Err(e)) if e.is_eof() => Step::Incomplete,
            Some(Err(e)) => Step::Invalid(e),
        }
    }

    fn resync(&mut self) {
        let dropped = match self.buf.iter().position(|b| *b == b'\n') {
            Some(nl) => nl + 1,
            None => self.buf.len(),
        };
        tracing::debug!(dropped, "frame decoder resync");
        self.buf.advance(dropped);
        self.scan = Scan::default();
    }
}
