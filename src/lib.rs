//! # Task Agent Execution Pipeline
//!
//! Client-side pipeline for streaming agent executions. A prompt is posted to
//! the tool-calling backend, which answers with a long-lived stream of
//! `data: {json}` frames describing the agent's progress. This crate turns
//! that stream into a paced, observable execution state: a tool call history,
//! a started flag, a final result, and connection flags.
//!
//! ## Quick Start
//!
//! ```no_run
//! use task_agent_pipeline::{ExecutionPipeline, PipelineOptions};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = ExecutionPipeline::connect(PipelineOptions::default())?;
//!     pipeline.start_execution("Create a Google Doc with this week's standup notes");
//!
//!     let mut updates = Box::pin(pipeline.updates());
//!     while let Some(snapshot) = updates.next().await {
//!         if let Some(tool) = snapshot.running_tool() {
//!             log::info!(
//!                 "Running {}: {}",
//!                 tool.display_name(),
//!                 tool.input_preview(50).unwrap_or_default()
//!             );
//!         }
//!         if let Some(result) = snapshot.execution_state.final_result {
//!             log::info!("{result}");
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pacing
//!
//! Events are delivered to the state no faster than one per
//! `min_event_duration` (1.5 s by default) so each step stays visible. The
//! first event of an idle pipeline is delivered at once. `error` events skip
//! the queue entirely and end the execution.
//!
//! ## Cancellation
//!
//! [`ExecutionPipeline::start_execution`] supersedes whatever was running and
//! [`ExecutionPipeline::clear`] stops it. In both cases nothing from the old
//! session reaches the state afterwards, including events already queued.
//!
//! ## Architecture
//!
//! - [`types`]: Events, tool calls, state snapshots, and options
//! - [`decoder`]: Frame reassembly and event parsing
//! - [`pacing`]: Minimum-spacing delivery queue
//! - [`reducer`]: Event application and tool call bookkeeping
//! - [`session`]: One cancellable request and its read loop
//! - [`transport`]: Transport abstraction and the HTTP implementation
//! - [`pipeline`]: The facade composing all of the above
//! - [`personality`]: Agent personality endpoint client
//! - [`error`]: Error types and handling
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T, PipelineError>`](Result). Failures
//! inside a running session never surface as `Err`; they are folded into the
//! execution state as an `Error: ...` final result.
//!
//! ```no_run
//! # use task_agent_pipeline::{ExecutionPipeline, PipelineError, PipelineOptions};
//! # fn example() {
//! match PipelineOptions::from_env().and_then(ExecutionPipeline::connect) {
//!     Ok(pipeline) => { /* ... */ }
//!     Err(PipelineError::InvalidConfig(msg)) => {
//!         log::error!("Bad pipeline configuration: {msg}");
//!     }
//!     Err(e) => {
//!         log::error!("Error: {e}");
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod error;
pub mod pacing;
pub mod personality;
pub mod pipeline;
pub mod reducer;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use decoder::EventDecoder;
pub use error::{PipelineError, Result};
pub use pacing::{Admission, PacingQueue};
pub use personality::{AgentPersonality, PersonalityClient};
pub use pipeline::ExecutionPipeline;
pub use reducer::{Applied, ExecutionReducer};
pub use session::{SessionOutcome, SessionSink, StreamSession};
pub use transport::{EventByteStream, HttpTransport, Transport};

// Re-export type submodules for flat public API
pub use types::events::{ExecutionEvent, ToolInput};
pub use types::identifiers::{SessionId, ToolCallId};
pub use types::options::{PipelineOptions, PipelineOptionsBuilder};
pub use types::state::{ExecutionPhase, ExecutionState, PipelineSnapshot};
pub use types::tool_call::{ToolCall, ToolCallStatus, ToolCategory};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
