//! Execution pipeline facade
//!
//! [`ExecutionPipeline`] is the entry point the UI layer talks to. It owns the
//! current stream session, the pacing queue, and the execution state, and
//! composes them:
//!
//! ```text
//!  start_execution(prompt)
//!        │
//!        ▼
//!  ┌──────────────┐ bytes ┌──────────────┐ events ┌─────────────┐ paced ┌─────────┐
//!  │  Transport   │──────▶│ EventDecoder │───────▶│ PacingQueue │──────▶│ Reducer │──▶ watch
//!  │(session task)│       └──────────────┘   │    └─────────────┘       └─────────┘
//!  └──────────────┘                          └──── `error` bypass ──────────▲
//! ```
//!
//! All state lives in one `PipelineCore` behind a mutex that is only
//! held for synchronous steps. Starting a new execution cancels the previous
//! session and resets the state inside a single step, so no event of a
//! superseded session can reach the new state.
//!
//! # Example
//!
//! ```no_run
//! use task_agent_pipeline::{ExecutionPipeline, PipelineOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = ExecutionPipeline::connect(PipelineOptions::from_env()?)?;
//! let mut updates = pipeline.subscribe();
//!
//! pipeline.start_execution("Email the team the release notes");
//!
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow_and_update().clone();
//!     for call in &snapshot.tool_calls {
//!         log::info!("{} [{:?}]", call.display_name(), call.status);
//!     }
//!     if let Some(result) = &snapshot.execution_state.final_result {
//!         log::info!("Done: {result}");
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod driver;
mod machine;

use std::sync::Arc;

use futures::Stream;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{Notify, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::pacing::PacingQueue;
use crate::session::{SessionOutcome, SessionSink, StreamSession};
use crate::transport::{HttpTransport, Transport};
use crate::types::events::ExecutionEvent;
use crate::types::identifiers::SessionId;
use crate::types::options::PipelineOptions;
use crate::types::state::{ExecutionState, PipelineSnapshot};
use crate::types::tool_call::ToolCall;

use self::machine::PipelineCore;

/// State shared between the facade, session tasks, and the pacing driver
pub(crate) struct Shared {
    core: Mutex<PipelineCore>,
    /// Wakes the pacing driver to re-read the deadline
    timer: Notify,
    shutdown: CancellationToken,
    state_tx: watch::Sender<PipelineSnapshot>,
}

impl Shared {
    /// Run one synchronous step on the core and publish the result
    fn step<R>(&self, f: impl FnOnce(&mut PipelineCore) -> R) -> R {
        let (result, snapshot) = {
            let mut core = self.core.lock();
            let before = core.revision();
            let result = f(&mut core);
            let snapshot = (core.revision() != before).then(|| core.snapshot());
            (result, snapshot)
        };

        // published outside the lock so observers may call back in
        if let Some(snapshot) = snapshot {
            self.state_tx.send_if_modified(|current| {
                if snapshot.revision > current.revision {
                    *current = snapshot;
                    true
                } else {
                    false
                }
            });
        }
        self.timer.notify_one();
        result
    }

    fn tick(&self, now: Instant) {
        self.step(|core| core.on_tick(now));
    }
}

impl SessionSink for Shared {
    fn on_connected(&self, session: SessionId) {
        self.step(|core| core.on_connected(session));
    }

    fn on_event(&self, session: SessionId, event: ExecutionEvent) {
        let now = Instant::now();
        self.step(|core| core.on_event(session, event, now));
    }

    fn on_closed(&self, session: SessionId, outcome: SessionOutcome) {
        self.step(|core| core.on_closed(session, outcome));
    }
}

/// Streaming execution pipeline for one task view
///
/// At most one execution is live at a time; `start_execution` always
/// supersedes the previous one.
pub struct ExecutionPipeline<T: Transport = HttpTransport> {
    shared: Arc<Shared>,
    transport: Arc<T>,
    runtime: Handle,
    max_frame_size: usize,
}

impl ExecutionPipeline<HttpTransport> {
    /// Create a pipeline talking HTTP to the configured backend
    ///
    /// # Errors
    /// Returns error if the options are invalid
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime
    pub fn connect(options: PipelineOptions) -> Result<Self> {
        let transport = HttpTransport::new(&options)?;
        Ok(Self::new(transport, &options))
    }
}

impl<T: Transport> ExecutionPipeline<T> {
    /// Create a pipeline on the current tokio runtime
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime
    pub fn new(transport: T, options: &PipelineOptions) -> Self {
        Self::from_parts(
            transport,
            PacingQueue::new(options.min_event_duration),
            options,
            Handle::current(),
        )
    }

    /// Create a pipeline from explicit parts
    ///
    /// `runtime` is where session and pacing tasks are spawned, which lets
    /// the control methods be called from threads outside the runtime.
    pub fn from_parts(
        transport: T,
        queue: PacingQueue,
        options: &PipelineOptions,
        runtime: Handle,
    ) -> Self {
        let (state_tx, _) = watch::channel(PipelineSnapshot::default());
        let shared = Arc::new(Shared {
            core: Mutex::new(PipelineCore::new(queue)),
            timer: Notify::new(),
            shutdown: CancellationToken::new(),
            state_tx,
        });

        runtime.spawn(driver::pacing_driver(shared.clone()));

        Self {
            shared,
            transport: Arc::new(transport),
            runtime,
            max_frame_size: options.max_frame_size,
        }
    }

    /// Start executing `prompt`, superseding any execution in progress
    ///
    /// Returns immediately; progress is observed through the state accessors.
    pub fn start_execution(&self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        self.shared.step(|core| {
            core.reset();
            let session = StreamSession::open(
                &self.runtime,
                self.transport.clone(),
                self.shared.clone(),
                prompt,
                self.max_frame_size,
            );
            core.begin(session);
        });
    }

    /// Cancel any execution in progress and reset to `Idle`
    pub fn clear(&self) {
        self.shared.step(PipelineCore::reset);
    }

    /// Current state, reflecting only delivered events
    #[must_use]
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.shared.core.lock().snapshot()
    }

    /// Tool call history in delivery order
    #[must_use]
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.snapshot().tool_calls
    }

    /// Started flag and final result
    #[must_use]
    pub fn execution_state(&self) -> ExecutionState {
        self.snapshot().execution_state
    }

    /// Whether a response body is currently being read
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.snapshot().is_connected
    }

    /// Whether an execution is in progress
    #[must_use]
    pub fn is_executing(&self) -> bool {
        self.snapshot().is_executing
    }

    /// Identifier of the live session, if any
    #[must_use]
    pub fn current_session(&self) -> Option<SessionId> {
        self.shared.core.lock().current_session()
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.shared.state_tx.subscribe()
    }

    /// Stream of snapshots, starting with the current one
    ///
    /// The stream ends when the pipeline is dropped.
    pub fn updates(&self) -> impl Stream<Item = PipelineSnapshot> + Send + 'static {
        let mut rx = self.subscribe();
        async_stream::stream! {
            loop {
                let snapshot = rx.borrow_and_update().clone();
                yield snapshot;
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }
}

impl<T: Transport> Drop for ExecutionPipeline<T> {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
        self.shared.step(PipelineCore::reset);
    }
}
