//! Execution event type definitions
//!
//! These are the typed progress events streamed by the agent backend while it
//! works through a prompt. The wire form is a JSON object discriminated by its
//! `type` field.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Tool input
// ============================================================================

/// Input passed to a tool, normalized for display
///
/// The backend sends either a plain string or a structured JSON value. Both are
/// flattened into [`ToolInput::display`] at decode time; the structured form is
/// kept in [`ToolInput::raw`] for consumers that want it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInput {
    display: String,
    raw: serde_json::Value,
}

impl ToolInput {
    /// Build a tool input from a raw JSON value
    #[must_use]
    pub fn from_value(raw: serde_json::Value) -> Self {
        let display = match &raw {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self { display, raw }
    }

    /// Display form of the input
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Original structured form of the input
    #[must_use]
    pub const fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Whether the backend sent a structured (non-string) input
    #[must_use]
    pub fn is_structured(&self) -> bool {
        !self.raw.is_string()
    }
}

impl From<&str> for ToolInput {
    fn from(s: &str) -> Self {
        Self::from_value(serde_json::Value::String(s.to_string()))
    }
}

impl From<serde_json::Value> for ToolInput {
    fn from(value: serde_json::Value) -> Self {
        Self::from_value(value)
    }
}

impl Serialize for ToolInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ToolInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_value)
    }
}

fn optional_tool_input<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ToolInput>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| !v.is_null())
        .map(ToolInput::from_value))
}

/// Accept any JSON value where a display string is expected
fn optional_display_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// ============================================================================
// Execution events
// ============================================================================

/// Progress event produced by the agent backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// Execution has started on the backend
    Started {
        /// Informational message
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The model requested one or more tool calls in an iteration
    ToolCallsDetected {
        /// Number of tool calls requested
        #[serde(default)]
        count: u32,
        /// Iteration of the agent loop
        #[serde(default)]
        iteration: u32,
    },
    /// A tool began executing
    ToolStarted {
        /// Name of the tool
        tool_name: String,
        /// Tool input, normalized for display
        #[serde(
            default,
            deserialize_with = "optional_tool_input",
            skip_serializing_if = "Option::is_none"
        )]
        input: Option<ToolInput>,
        /// Iteration of the agent loop
        #[serde(default, skip_serializing_if = "Option::is_none")]
        iteration: Option<u32>,
    },
    /// The running tool finished
    ToolCompleted {
        /// Name of the tool
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
        /// Tool output
        #[serde(
            default,
            deserialize_with = "optional_display_string",
            skip_serializing_if = "Option::is_none"
        )]
        output: Option<String>,
    },
    /// The running tool failed
    ToolError {
        /// Name of the tool
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
        /// Error detail
        #[serde(
            default,
            deserialize_with = "optional_display_string",
            skip_serializing_if = "Option::is_none"
        )]
        error: Option<String>,
    },
    /// The agent produced its final answer
    FinalResult {
        /// Final answer
        message: String,
    },
    /// The agent loop hit its iteration limit
    MaxIterationsReached {
        /// Informational message from the backend
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Execution failed
    Error {
        /// Error detail
        message: String,
    },
}

impl ExecutionEvent {
    /// Wire name of this event's kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::ToolCallsDetected { .. } => "tool_calls_detected",
            Self::ToolStarted { .. } => "tool_started",
            Self::ToolCompleted { .. } => "tool_completed",
            Self::ToolError { .. } => "tool_error",
            Self::FinalResult { .. } => "final_result",
            Self::MaxIterationsReached { .. } => "max_iterations_reached",
            Self::Error { .. } => "error",
        }
    }

    /// Whether this event ends the session
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FinalResult { .. } | Self::MaxIterationsReached { .. } | Self::Error { .. }
        )
    }

    /// Whether this event skips the pacing queue
    #[must_use]
    pub const fn is_urgent(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Convenience constructor for a `started` event
    #[must_use]
    pub const fn started() -> Self {
        Self::Started { message: None }
    }

    /// Convenience constructor for a `tool_started` event
    pub fn tool_started(tool_name: impl Into<String>, input: Option<ToolInput>) -> Self {
        Self::ToolStarted {
            tool_name: tool_name.into(),
            input,
            iteration: None,
        }
    }

    /// Convenience constructor for a `tool_completed` event
    pub fn tool_completed(output: impl Into<String>) -> Self {
        Self::ToolCompleted {
            tool_name: None,
            output: Some(output.into()),
        }
    }

    /// Convenience constructor for a `final_result` event
    pub fn final_result(message: impl Into<String>) -> Self {
        Self::FinalResult {
            message: message.into(),
        }
    }

    /// Convenience constructor for an `error` event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
