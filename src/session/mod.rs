//! Stream session
//!
//! A [`StreamSession`] owns one outbound execution request, the task reading
//! its body, and the cancellation token that stops that task. Bytes are fed
//! through an [`EventDecoder`] and every decoded event is handed to a
//! [`SessionSink`] tagged with the session id, in arrival order.
//!
//! Cancellation is cooperative: the read loop checks the token before every
//! read step and exits with [`PipelineError::Cancelled`].

use std::sync::Arc;

use bytes::BytesMut;
use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::codec::Decoder;
use tokio_util::sync::CancellationToken;

use crate::decoder::EventDecoder;
use crate::error::PipelineError;
use crate::transport::Transport;
use crate::types::events::ExecutionEvent;
use crate::types::identifiers::SessionId;

/// How a session's read loop ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// The backend closed the stream
    Completed,
    /// The loop stopped early, with [`PipelineError::Cancelled`] when that
    /// was requested locally
    Aborted(PipelineError),
}

impl SessionOutcome {
    /// Whether the session ended because it was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Aborted(e) if e.is_cancellation())
    }
}

/// Receiver of everything a session produces
///
/// Implementations must ignore calls for a session id they no longer
/// consider current.
pub trait SessionSink: Send + Sync + 'static {
    /// The response body is available
    fn on_connected(&self, session: SessionId);
    /// One decoded event, in arrival order
    fn on_event(&self, session: SessionId, event: ExecutionEvent);
    /// The read loop has ended
    fn on_closed(&self, session: SessionId, outcome: SessionOutcome);
}

/// Handle to one running session
///
/// Dropping the handle cancels the session.
#[derive(Debug)]
pub struct StreamSession {
    id: SessionId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Parameters of a session's read loop
struct ReadLoop<T, S> {
    id: SessionId,
    transport: Arc<T>,
    sink: Arc<S>,
    prompt: String,
    max_frame_size: usize,
    token: CancellationToken,
}

impl StreamSession {
    /// Spawn a session for `prompt` on `runtime`
    pub fn open<T: Transport, S: SessionSink>(
        runtime: &Handle,
        transport: Arc<T>,
        sink: Arc<S>,
        prompt: String,
        max_frame_size: usize,
    ) -> Self {
        let id = SessionId::new();
        let token = CancellationToken::new();

        let read_loop = ReadLoop {
            id,
            transport,
            sink,
            prompt,
            max_frame_size,
            token: token.clone(),
        };
        let task = runtime.spawn(read_loop.run());

        Self { id, token, task }
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Signal the read loop to stop
    pub fn cancel(&self) {
        if !self.is_cancelled() {
            log::info!("[{}] Cancelling session", self.id);
            self.token.cancel();
        }
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the read loop has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl<T: Transport, S: SessionSink> ReadLoop<T, S> {
    async fn run(self) {
        let id = self.id;
        log::info!("[{id}] Opening execution stream");

        let opened = tokio::select! {
            biased;
            () = self.token.cancelled() => {
                self.sink.on_closed(id, SessionOutcome::Aborted(PipelineError::Cancelled));
                return;
            }
            result = self.transport.open(&self.prompt) => result,
        };

        let mut body = match opened {
            Ok(body) => body,
            Err(e) => {
                log::error!("[{id}] Failed to open execution stream: {e}");
                self.sink.on_closed(id, SessionOutcome::Aborted(e));
                return;
            }
        };

        self.sink.on_connected(id);
        log::info!("[{id}] Connected");

        let mut decoder = EventDecoder::with_max_frame_size(self.max_frame_size);
        let mut buffer = BytesMut::new();

        let outcome = loop {
            let chunk = tokio::select! {
                biased;
                () = self.token.cancelled() => {
                    break SessionOutcome::Aborted(PipelineError::Cancelled);
                }
                chunk = body.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    buffer.extend_from_slice(&bytes);
                    self.forward(&mut decoder, &mut buffer, false);
                }
                Some(Err(e)) => {
                    log::error!("[{id}] Stream read failed: {e}");
                    break SessionOutcome::Aborted(e);
                }
                None => {
                    self.forward(&mut decoder, &mut buffer, true);
                    break SessionOutcome::Completed;
                }
            }

            // a terminal event tears the session down from the sink side
            if self.token.is_cancelled() {
                break SessionOutcome::Aborted(PipelineError::Cancelled);
            }
        };

        log::info!(
            "[{id}] Stream ended ({outcome:?}) after {} events, {} dropped frames",
            decoder.decoded_events(),
            decoder.dropped_frames()
        );
        self.sink.on_closed(id, outcome);
    }

    /// Hand every complete event in `buffer` to the sink
    fn forward(&self, decoder: &mut EventDecoder, buffer: &mut BytesMut, eof: bool) {
        loop {
            if self.token.is_cancelled() {
                return;
            }

            let next = if eof {
                decoder.decode_eof(buffer)
            } else {
                decoder.decode(buffer)
            };

            match next {
                Ok(Some(event)) => self.sink.on_event(self.id, event),
                Ok(None) => return,
                // the decoder already counted and logged the dropped frame
                Err(e) if !e.is_fatal() => {}
                Err(e) => {
                    log::warn!("[{}] Decoder error: {e}", self.id);
                    return;
                }
            }
        }
    }
}
