//! Observable execution state

use serde::{Deserialize, Serialize};

use super::tool_call::ToolCall;

/// Literal result recorded when the backend stops at its iteration limit
pub const MAX_ITERATIONS_MESSAGE: &str = "Task execution stopped due to iteration limit";

/// Execution state as seen by the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    /// Set by the first `started` event, cleared only by an explicit clear
    pub is_started: bool,
    /// Set once per session by the first terminal event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_result: Option<String>,
}

/// Reducer state machine position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    /// Nothing has happened yet
    #[default]
    Idle,
    /// Backend acknowledged the prompt
    Started,
    /// At least one tool has been started
    Executing,
    /// A terminal event has been applied
    Terminal,
}

impl ExecutionPhase {
    /// Whether a terminal event has been applied
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal)
    }
}

/// Everything the UI layer renders, reflecting only delivered events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    /// Tool call history in delivery order
    pub tool_calls: Vec<ToolCall>,
    /// Whether a response body is currently being read
    pub is_connected: bool,
    /// Whether an execution is in progress
    pub is_executing: bool,
    /// Started flag and final result
    pub execution_state: ExecutionState,
    /// Reducer phase
    pub phase: ExecutionPhase,
    /// Increases with every observable change
    pub revision: u64,
}

impl PipelineSnapshot {
    /// The tool call that is currently running, if any
    #[must_use]
    pub fn running_tool(&self) -> Option<&ToolCall> {
        self.tool_calls.iter().find(|call| call.is_running())
    }
}
