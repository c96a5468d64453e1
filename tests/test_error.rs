//! Unit tests for error classification and user-facing messages

use std::io;

use pretty_assertions::assert_eq;
use task_agent_pipeline::PipelineError;

#[test]
fn test_cancelled_is_not_a_failure() {
    let err = PipelineError::Cancelled;
    assert!(err.is_cancellation());
    assert!(!err.is_fatal());
    assert_eq!(err.to_string(), "Session cancelled");
}

#[test]
fn test_frame_level_errors_are_recoverable() {
    let too_large = PipelineError::FrameTooLarge { limit: 1024 };
    assert!(!too_large.is_fatal());
    assert!(!too_large.is_cancellation());
    assert_eq!(
        too_large.to_string(),
        "Stream frame exceeded maximum size of 1024 bytes"
    );

    assert!(!PipelineError::decode("bad frame", None).is_fatal());
    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(!PipelineError::from(json).is_fatal());
}

#[test]
fn test_transport_errors_end_the_session() {
    let err = PipelineError::transport("Stream interrupted: connection reset");
    assert!(err.is_fatal());
    assert!(!err.is_cancellation());
    assert_eq!(err.user_message(), "Stream interrupted: connection reset");
}

#[test]
fn test_http_status_user_message() {
    let err = PipelineError::http_status(500, Some("boom".to_string()));
    assert!(err.is_fatal());
    assert_eq!(err.user_message(), "HTTP error! status: 500");
    assert_eq!(err.to_string(), "Backend returned HTTP 500");
}

#[test]
fn test_io_error_conversion() {
    let err = PipelineError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
    assert!(matches!(err, PipelineError::Io(_)));
    assert!(err.is_fatal());
    assert_eq!(err.user_message(), "IO error: eof");
}

#[test]
fn test_invalid_config_message() {
    let err = PipelineError::invalid_config("endpoint must be an http(s) URL");
    assert_eq!(
        err.user_message(),
        "Invalid configuration: endpoint must be an http(s) URL"
    );
}
