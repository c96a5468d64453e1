//! Newtype wrappers for type safety
//!
//! This module contains newtype wrappers that keep session and tool call
//! identifiers from being mixed with arbitrary strings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Newtype Wrappers for Type Safety
// ============================================================================

/// Identifier of one streaming session
///
/// A fresh id is minted for every `start_execution`; events tagged with any
/// other id are stale and get dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form keeps log lines readable
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

/// Tool call ID newtype
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCallId(String);

impl ToolCallId {
    /// Build an id from the tool name, creation time, and a sequence number
    ///
    /// The sequence number comes from a counter that is never rewound, so ids
    /// stay unique even for the same tool started twice within a millisecond.
    #[must_use]
    pub fn generate(tool_name: &str, created_at: DateTime<Utc>, sequence: u64) -> Self {
        Self(format!(
            "{tool_name}-{}-{sequence}",
            created_at.timestamp_millis()
        ))
    }

    /// Get the tool call ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ToolCallId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ToolCallId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
