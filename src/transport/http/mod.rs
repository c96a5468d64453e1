//! HTTP transport for the agent backend
//!
//! Issues `POST <endpoint>/tool-calling/execute-stream` with a JSON body
//! `{"prompt": ...}` and exposes the chunked response as an
//! [`EventByteStream`](super::EventByteStream).

mod config;
mod transport;

pub use config::{ExecuteRequest, build_client};
pub use transport::HttpTransport;
