//! Event decoder for the execution stream
//!
//! The backend answers with a chunked body of newline-delimited frames. Frames
//! starting with `data: ` carry a JSON event; everything else is ignored.
//! [`EventDecoder`] reassembles frames split across chunk boundaries and never
//! fails the stream because of a single bad frame.

mod codec;
mod parser;

pub use codec::EventDecoder;
pub use parser::{DATA_PREFIX, parse_event, parse_event_value, parse_frame};
