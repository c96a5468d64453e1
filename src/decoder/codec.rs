//! Incremental frame decoder

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::error::{PipelineError, Result};
use crate::types::events::ExecutionEvent;
use crate::types::options::DEFAULT_MAX_FRAME_SIZE;

use super::parser::parse_frame;

/// Turns raw stream bytes into execution events
///
/// Bytes are appended to a buffer by the caller; each call to
/// [`Decoder::decode`] yields the next event in arrival order, or `None` once
/// only a partial frame remains. Malformed frames are logged and skipped.
/// A frame over the size limit yields [`PipelineError::FrameTooLarge`] once;
/// decoding may continue after it, as with `LinesCodec`.
#[derive(Debug)]
pub struct EventDecoder {
    max_frame_size: usize,
    /// Offset already scanned for a newline
    next_index: usize,
    /// Dropping the rest of an oversized frame
    discarding: bool,
    decoded: u64,
    dropped: u64,
}

impl EventDecoder {
    /// Create a decoder with the default frame size limit
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a decoder that discards frames longer than `max_frame_size`
    #[must_use]
    pub const fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            next_index: 0,
            discarding: false,
            decoded: 0,
            dropped: 0,
        }
    }

    /// Number of events decoded so far
    #[must_use]
    pub const fn decoded_events(&self) -> u64 {
        self.decoded
    }

    /// Number of frames dropped as malformed or oversized
    #[must_use]
    pub const fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    /// Split the next complete line off the buffer, without its newline
    ///
    /// Fails once per oversized frame; the rest of that frame is discarded on
    /// later calls.
    fn next_line(&mut self, buf: &mut BytesMut) -> Result<Option<BytesMut>> {
        loop {
            let newline = buf[self.next_index..].iter().position(|b| *b == b'\n');

            match newline {
                Some(offset) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let mut line = buf.split_to(end + 1);
                    line.truncate(end);

                    if self.discarding {
                        self.discarding = false;
                        continue;
                    }
                    if line.len() > self.max_frame_size {
                        return Err(self.oversized());
                    }
                    return Ok(Some(line));
                }
                None => {
                    if self.discarding {
                        buf.clear();
                        self.next_index = 0;
                    } else if buf.len() > self.max_frame_size {
                        self.discarding = true;
                        buf.clear();
                        self.next_index = 0;
                        return Err(self.oversized());
                    } else {
                        self.next_index = buf.len();
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn oversized(&mut self) -> PipelineError {
        let error = PipelineError::FrameTooLarge {
            limit: self.max_frame_size,
        };
        self.drop_frame(&error);
        error
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<ExecutionEvent> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => {
                self.drop_frame(&PipelineError::decode(format!("invalid UTF-8: {e}"), None));
                return None;
            }
        };

        match parse_frame(text) {
            Ok(Some(event)) => {
                self.decoded += 1;
                log::debug!("Decoded {} event (#{})", event.kind(), self.decoded);
                Some(event)
            }
            Ok(None) => None,
            Err(e) => {
                self.drop_frame(&e);
                None
            }
        }
    }

    fn drop_frame(&mut self, error: &PipelineError) {
        self.dropped += 1;
        match error {
            PipelineError::Decode {
                frame: Some(frame), ..
            } => log::warn!("Dropping stream frame: {error} ({frame})"),
            _ => log::warn!("Dropping stream frame: {error}"),
        }
    }
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for EventDecoder {
    type Item = ExecutionEvent;
    type Error = PipelineError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<ExecutionEvent>> {
        while let Some(line) = self.next_line(buf)? {
            if let Some(event) = self.decode_line(&line) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<ExecutionEvent>> {
        if let Some(event) = self.decode(buf)? {
            return Ok(Some(event));
        }

        // a last frame without a trailing newline still counts
        if buf.is_empty() || self.discarding {
            buf.clear();
            self.discarding = false;
            self.next_index = 0;
            return Ok(None);
        }
        let line = buf.split_to(buf.len());
        self.next_index = 0;
        let event = self.decode_line(line.chunk());
        Ok(event)
    }
}
