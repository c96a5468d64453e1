//! Transport layer for reaching the agent backend
//!
//! This module provides the transport abstraction the stream session reads
//! from, and the HTTP implementation used in production. Tests and embedders
//! can supply their own [`Transport`] to feed scripted byte streams.

pub mod http;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;

/// Body of a streaming execution response, chunk by chunk
pub type EventByteStream = BoxStream<'static, Result<Bytes>>;

/// Transport trait for opening execution streams
///
/// One call to [`Transport::open`] corresponds to one session: it issues the
/// request for `prompt` and hands back the response body as a byte stream.
pub trait Transport: Send + Sync + 'static {
    /// Open a streaming execution for `prompt`
    ///
    /// # Errors
    /// Returns error if the request fails or the backend answers with a
    /// non-success status; no body is read in that case
    fn open(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<EventByteStream>> + Send;
}

pub use http::HttpTransport;
