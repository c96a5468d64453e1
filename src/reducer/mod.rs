//! Execution state reducer
//!
//! Folds delivered events into the tool call history and the
//! [`ExecutionState`] the UI renders:
//!
//! ```text
//! Idle ──started──▶ Started ──tool_started──▶ Executing ⇄ tool_completed / tool_error
//!   │                  │                          │
//!   └──────────────────┴── final_result / max_iterations_reached / error ──▶ Terminal
//! ```
//!
//! Tool execution is single-flight: at most one [`ToolCall`] is `started` at
//! any time, and `tool_completed` / `tool_error` always close that one.

use chrono::{DateTime, Utc};

use crate::types::events::ExecutionEvent;
use crate::types::identifiers::ToolCallId;
use crate::types::state::{ExecutionPhase, ExecutionState, MAX_ITERATIONS_MESSAGE};
use crate::types::tool_call::{DEFAULT_INPUT_PREVIEW_CHARS, ToolCall, ToolCallStatus};

/// Effect of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Observable state changed
    Updated,
    /// Nothing observable changed
    Unchanged,
    /// A terminal event was applied; the session must end
    Terminal,
}

/// Owns the tool call history and execution state of one task view
#[derive(Debug, Default)]
pub struct ExecutionReducer {
    tool_calls: Vec<ToolCall>,
    state: ExecutionState,
    phase: ExecutionPhase,
    /// Feeds tool call ids; survives `clear` so ids are never reused
    sequence: u64,
    iterations_seen: u32,
}

impl ExecutionReducer {
    /// Create a reducer in the `Idle` phase
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one delivered event at wall-clock time `now`
    pub fn apply(&mut self, event: ExecutionEvent, now: DateTime<Utc>) -> Applied {
        if self.phase.is_terminal() && !event.is_terminal() {
            log::debug!("Ignoring {} event after terminal state", event.kind());
            return Applied::Unchanged;
        }

        match event {
            ExecutionEvent::Started { .. } => {
                if self.phase == ExecutionPhase::Idle {
                    self.phase = ExecutionPhase::Started;
                }
                if self.state.is_started {
                    return Applied::Unchanged;
                }
                self.state.is_started = true;
                Applied::Updated
            }
            ExecutionEvent::ToolCallsDetected { count, iteration } => {
                log::info!("Tool calls detected: {count} tools in iteration {iteration}");
                self.iterations_seen = self.iterations_seen.max(iteration);
                Applied::Unchanged
            }
            ExecutionEvent::ToolStarted {
                tool_name,
                input,
                iteration,
            } => {
                if tool_name.trim().is_empty() {
                    log::warn!("Ignoring tool_started event without a tool name");
                    return Applied::Unchanged;
                }
                if let Some(running) = self.running_mut() {
                    log::warn!(
                        "Tool {} started while {} is still running; closing the earlier call",
                        tool_name,
                        running.tool_name
                    );
                    running.status = ToolCallStatus::Completed;
                }

                self.sequence += 1;
                let id = ToolCallId::generate(&tool_name, now, self.sequence);
                let (input, raw_input) = input.map_or((None, None), |input| {
                    let raw = input.is_structured().then(|| input.raw().clone());
                    (Some(input.display().to_string()), raw)
                });

                let call = ToolCall {
                    id,
                    tool_name,
                    input,
                    raw_input,
                    output: None,
                    status: ToolCallStatus::Started,
                    iteration,
                    timestamp: now,
                };
                log::info!(
                    "Tool started: {} {}",
                    call.display_name(),
                    call.input_preview(DEFAULT_INPUT_PREVIEW_CHARS).unwrap_or_default()
                );
                self.tool_calls.push(call);
                self.phase = ExecutionPhase::Executing;
                Applied::Updated
            }
            ExecutionEvent::ToolCompleted { output, .. } => self.complete_running(output, None),
            ExecutionEvent::ToolError { tool_name, error } => {
                let detail = error.unwrap_or_else(|| "unknown error".to_string());
                self.complete_running(Some(format!("Error: {detail}")), tool_name.as_deref())
            }
            ExecutionEvent::FinalResult { message } => self.finish(message),
            ExecutionEvent::MaxIterationsReached { .. } => {
                self.finish(MAX_ITERATIONS_MESSAGE.to_string())
            }
            ExecutionEvent::Error { message } => self.finish(format!("Error: {message}")),
        }
    }

    /// Reset to `Idle`
    pub fn clear(&mut self) {
        self.tool_calls.clear();
        self.state = ExecutionState::default();
        self.phase = ExecutionPhase::Idle;
        self.iterations_seen = 0;
    }

    /// Tool call history in delivery order
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    /// Current execution state
    #[must_use]
    pub const fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> ExecutionPhase {
        self.phase
    }

    /// Highest agent iteration reported so far
    #[must_use]
    pub const fn iterations_seen(&self) -> u32 {
        self.iterations_seen
    }

    fn running_mut(&mut self) -> Option<&mut ToolCall> {
        self.tool_calls
            .iter_mut()
            .find(|call| call.status == ToolCallStatus::Started)
    }

    fn complete_running(&mut self, output: Option<String>, reported_tool: Option<&str>) -> Applied {
        let Some(running) = self.running_mut() else {
            log::warn!("Tool completion received with no running tool call");
            return Applied::Unchanged;
        };

        if let Some(reported) = reported_tool
            && reported != running.tool_name
        {
            log::warn!(
                "Tool error for {reported} matched to running call {}",
                running.tool_name
            );
        }

        running.output = output;
        running.status = ToolCallStatus::Completed;
        Applied::Updated
    }

    fn finish(&mut self, result: String) -> Applied {
        if self.state.final_result.is_none() {
            self.state.final_result = Some(result);
        } else {
            log::debug!("Final result already set, keeping the first one");
        }
        self.phase = ExecutionPhase::Terminal;
        Applied::Terminal
    }
}
