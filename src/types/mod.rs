//! Type definitions for the execution pipeline
//!
//! - [`identifiers`] - Type-safe ID wrappers (`SessionId`, `ToolCallId`)
//! - [`events`] - Execution events decoded from the backend stream
//! - [`tool_call`] - Tool call records and display helpers
//! - [`state`] - Observable execution state and snapshots
//! - [`options`] - Pipeline configuration

pub mod events;
pub mod identifiers;
pub mod options;
pub mod state;
pub mod tool_call;

pub use events::{ExecutionEvent, ToolInput};
pub use identifiers::{SessionId, ToolCallId};
pub use options::{PipelineOptions, PipelineOptionsBuilder};
pub use state::{ExecutionPhase, ExecutionState, MAX_ITERATIONS_MESSAGE, PipelineSnapshot};
pub use tool_call::{ToolCall, ToolCallStatus, ToolCategory};
