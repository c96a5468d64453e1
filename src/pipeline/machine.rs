//! Synchronous pipeline state machine
//!
//! Every input (a control call, a decoded event, a session ending, a pacing
//! deadline passing) is one short, non-suspending step on [`PipelineCore`].
//! The caller holds the core lock for the duration of the step and never
//! across an `.await`.

use chrono::Utc;
use tokio::time::Instant;

use crate::pacing::{Admission, PacingQueue};
use crate::reducer::{Applied, ExecutionReducer};
use crate::session::{SessionOutcome, StreamSession};
use crate::types::events::ExecutionEvent;
use crate::types::identifiers::SessionId;
use crate::types::state::PipelineSnapshot;

/// State owned exclusively by one pipeline instance
#[derive(Debug)]
pub(crate) struct PipelineCore {
    queue: PacingQueue,
    reducer: ExecutionReducer,
    session: Option<StreamSession>,
    /// Current session is still reading its body
    stream_open: bool,
    connected: bool,
    executing: bool,
    /// Bumped on every observable change
    revision: u64,
}

impl PipelineCore {
    pub(crate) fn new(queue: PacingQueue) -> Self {
        Self {
            queue,
            reducer: ExecutionReducer::new(),
            session: None,
            stream_open: false,
            connected: false,
            executing: false,
            revision: 0,
        }
    }

    /// Cancel and discard the current session, then reset to `Idle`
    pub(crate) fn reset(&mut self) {
        self.teardown_session();
        self.queue.reset();
        self.reducer.clear();
        self.executing = false;
        self.revision += 1;
    }

    /// Install a freshly opened session; the core must have been reset first
    pub(crate) fn begin(&mut self, session: StreamSession) {
        log::info!("[{}] Execution started", session.id());
        self.session = Some(session);
        self.stream_open = true;
        self.executing = true;
        self.revision += 1;
    }

    pub(crate) fn is_current(&self, session: SessionId) -> bool {
        self.session.as_ref().is_some_and(|s| s.id() == session)
    }

    pub(crate) fn current_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(StreamSession::id)
    }

    pub(crate) fn on_connected(&mut self, session: SessionId) {
        if !self.is_current(session) {
            return;
        }
        self.connected = true;
        self.revision += 1;
    }

    pub(crate) fn on_event(&mut self, session: SessionId, event: ExecutionEvent, now: Instant) {
        if !self.is_current(session) {
            log::debug!("[{session}] Dropping {} event from stale session", event.kind());
            return;
        }

        match self.queue.enqueue(event, now) {
            Admission::Bypass(event) | Admission::Immediate(event) => self.deliver(event),
            Admission::Queued { pending, .. } => {
                log::debug!("[{session}] {pending} events waiting for delivery");
            }
        }
    }

    pub(crate) fn on_closed(&mut self, session: SessionId, outcome: SessionOutcome) {
        if !self.is_current(session) {
            return;
        }

        self.stream_open = false;
        self.connected = false;
        self.revision += 1;

        match outcome {
            SessionOutcome::Aborted(e) if e.is_cancellation() => {
                log::debug!("[{session}] Stream cancelled");
                self.settle();
            }
            SessionOutcome::Aborted(e) if e.is_fatal() => {
                let message = e.user_message();
                log::error!("[{session}] Execution failed: {message}");
                self.deliver(ExecutionEvent::error(message));
            }
            SessionOutcome::Aborted(e) => {
                log::warn!("[{session}] Stream ended with recoverable error: {e}");
                self.settle();
            }
            SessionOutcome::Completed => self.settle(),
        }
    }

    /// Release whatever the pacing queue has due at `now`
    pub(crate) fn on_tick(&mut self, now: Instant) {
        while let Some(event) = self.queue.poll(now) {
            self.deliver(event);
        }
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.queue.deadline()
    }

    pub(crate) const fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            tool_calls: self.reducer.tool_calls().to_vec(),
            is_connected: self.connected,
            is_executing: self.executing,
            execution_state: self.reducer.state().clone(),
            phase: self.reducer.phase(),
            revision: self.revision,
        }
    }

    fn deliver(&mut self, event: ExecutionEvent) {
        let kind = event.kind();
        match self.reducer.apply(event, Utc::now()) {
            Applied::Terminal => {
                log::info!("Terminal {kind} event applied, ending session");
                self.teardown_session();
                self.queue.reset();
                self.executing = false;
                self.revision += 1;
            }
            Applied::Updated => {
                self.revision += 1;
                self.settle();
            }
            Applied::Unchanged => self.settle(),
        }
    }

    /// Execution is over once the stream closed and the queue drained
    fn settle(&mut self) {
        if self.executing && !self.stream_open && self.queue.is_empty() {
            self.executing = false;
            self.revision += 1;
        }
    }

    fn teardown_session(&mut self) {
        if let Some(session) = self.session.take() {
            if session.is_finished() {
                log::debug!("[{}] Session already finished", session.id());
            } else {
                session.cancel();
            }
        }
        self.stream_open = false;
        self.connected = false;
    }
}
