//! Frame and payload parsing for the execution stream

use crate::error::{PipelineError, Result};
use crate::types::events::ExecutionEvent;

/// Prefix that marks a significant frame
pub const DATA_PREFIX: &str = "data: ";

/// Parse one newline-delimited frame
///
/// Returns `Ok(None)` for frames that carry no event: blank lines, comments,
/// non-`data: ` fields, and `data: ` frames with an empty payload.
///
/// # Errors
/// Returns `PipelineError::Decode` if the payload is not a valid event
pub fn parse_frame(frame: &str) -> Result<Option<ExecutionEvent>> {
    let frame = frame.strip_suffix('\r').unwrap_or(frame);
    let Some(payload) = frame.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };

    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(None);
    }

    parse_event(payload).map(Some)
}

/// Parse a JSON payload into a typed event
///
/// # Errors
/// Returns `PipelineError::Decode` if the payload is not JSON or does not
/// match any event shape
pub fn parse_event(payload: &str) -> Result<ExecutionEvent> {
    let value: serde_json::Value = serde_json::from_str(payload).map_err(|e| {
        PipelineError::decode(format!("invalid JSON: {e}"), Some(payload.to_string()))
    })?;
    parse_event_value(value)
}

/// Parse a JSON value into a typed event
///
/// # Errors
/// Returns `PipelineError::Decode` if the value does not match any event shape
pub fn parse_event_value(data: serde_json::Value) -> Result<ExecutionEvent> {
    serde_json::from_value(data.clone()).map_err(|e| {
        PipelineError::decode(
            format!("Failed to parse event: {e}"),
            Some(data.to_string()),
        )
    })
}
