//! Tool call records
//!
//! A [`ToolCall`] is the reducer's record of one backend tool invocation,
//! created by a `tool_started` event and completed exactly once by the
//! matching `tool_completed` or `tool_error`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::ToolCallId;

/// Default width of the input preview shown next to a tool call
pub const DEFAULT_INPUT_PREVIEW_CHARS: usize = 50;

/// Status of a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    /// The tool is running
    Started,
    /// The tool finished, successfully or not
    Completed,
}

/// Record of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Unique id, never reused
    pub id: ToolCallId,
    /// Backend tool name, e.g. `send_gmail_message`
    #[serde(rename = "tool_name")]
    pub tool_name: String,
    /// Input in display form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Structured input as sent by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_input: Option<serde_json::Value>,
    /// Output or `Error: ...` text once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Current status
    pub status: ToolCallStatus,
    /// Agent loop iteration reported by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u32>,
    /// When the call was recorded
    pub timestamp: DateTime<Utc>,
}

impl ToolCall {
    /// Whether the tool is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == ToolCallStatus::Started
    }

    /// Whether the call carries non-blank output
    #[must_use]
    pub fn has_output(&self) -> bool {
        self.output.as_deref().is_some_and(|o| !o.trim().is_empty())
    }

    /// Human readable tool name: `create_google_doc` becomes `Create Google Doc`
    #[must_use]
    pub fn display_name(&self) -> String {
        self.tool_name
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Input truncated to `max_chars` characters, with `...` appended when cut
    #[must_use]
    pub fn input_preview(&self, max_chars: usize) -> Option<String> {
        let input = self.input.as_deref()?;
        if input.chars().count() > max_chars {
            let head: String = input.chars().take(max_chars).collect();
            Some(format!("{head}..."))
        } else {
            Some(input.to_string())
        }
    }

    /// Icon category of the tool
    #[must_use]
    pub fn category(&self) -> ToolCategory {
        ToolCategory::for_tool(&self.tool_name)
    }
}

/// Coarse grouping of backend tools, used to pick an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Mail tools
    Email,
    /// Google Docs tools
    Document,
    /// Issue tracker tools
    Issue,
    /// Pull request and review tools
    PullRequest,
    /// Repository file tools
    File,
    /// Branch management tools
    Branch,
    /// Search tools
    Search,
    /// Anything else
    Other,
}

impl ToolCategory {
    /// Classify a backend tool name
    #[must_use]
    pub fn for_tool(tool_name: &str) -> Self {
        let name = tool_name.to_ascii_lowercase();
        if name.starts_with("search_") {
            Self::Search
        } else if name.contains("gmail") || name.contains("email") {
            Self::Email
        } else if name.contains("google_doc") {
            Self::Document
        } else if name.contains("pull_request") || name.contains("_pr") || name.contains("review")
        {
            Self::PullRequest
        } else if name.contains("issue") {
            Self::Issue
        } else if name.contains("file") {
            Self::File
        } else if name.contains("branch") {
            Self::Branch
        } else {
            Self::Other
        }
    }
}
