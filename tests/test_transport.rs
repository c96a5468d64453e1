//! Integration tests for the HTTP transport
//!
//! Runs against a local mock backend

use std::time::Duration;

use futures::TryStreamExt;
use httpmock::Method::POST;
use httpmock::MockServer;
use pretty_assertions::assert_eq;
use serde_json::json;
use task_agent_pipeline::{
    ExecutionPipeline, HttpTransport, PipelineError, PipelineOptions, ToolCallStatus, Transport,
};

const STREAM_PATH: &str = "/tool-calling/execute-stream";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn options_for(server: &MockServer) -> PipelineOptions {
    PipelineOptions::builder()
        .endpoint(server.base_url())
        .min_event_duration(Duration::from_millis(20))
        .build()
}

#[test]
fn test_transport_url() {
    let options = PipelineOptions::builder()
        .endpoint("http://agent.local:9000/")
        .build();
    let transport = HttpTransport::new(&options).unwrap();
    assert_eq!(
        transport.url(),
        "http://agent.local:9000/tool-calling/execute-stream"
    );
}

#[test]
fn test_transport_rejects_invalid_endpoint() {
    let options = PipelineOptions::builder().endpoint("agent.local").build();
    let result = HttpTransport::new(&options);
    assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
}

#[test]
fn test_transport_with_existing_client() {
    let options = PipelineOptions::builder()
        .endpoint("https://agent.example.com")
        .build();
    let transport = HttpTransport::with_client(reqwest::Client::new(), &options).unwrap();
    assert_eq!(
        transport.url(),
        "https://agent.example.com/tool-calling/execute-stream"
    );

    let invalid = PipelineOptions::builder().endpoint("").build();
    let result = HttpTransport::with_client(reqwest::Client::new(), &invalid);
    assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_open_posts_prompt_and_streams_body() {
    init_logging();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(STREAM_PATH)
                .header("accept", "text/event-stream")
                .header("x-app", "desktop")
                .json_body(json!({ "prompt": "Summarize my inbox" }));
            then.status(200)
                .header("content-type", "text/event-stream")
                .body("data: {\"type\":\"started\"}\n\n");
        })
        .await;

    let options = PipelineOptions::builder()
        .endpoint(server.base_url())
        .header("x-app", "desktop")
        .build();
    let transport = HttpTransport::new(&options).unwrap();

    let body = transport.open("Summarize my inbox").await.unwrap();
    let chunks: Vec<_> = body.try_collect().await.unwrap();
    let bytes: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "data: {\"type\":\"started\"}\n\n"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_open_maps_error_status() {
    init_logging();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(STREAM_PATH);
            then.status(503).body("overloaded");
        })
        .await;

    let transport = HttpTransport::new(&options_for(&server)).unwrap();
    let result = transport.open("hi").await;

    match result {
        Err(e @ PipelineError::HttpStatus { status: 503, .. }) => {
            assert_eq!(e.user_message(), "HTTP error! status: 503");
        }
        Err(other) => panic!("expected HTTP status error, got {other:?}"),
        Ok(_) => panic!("expected HTTP status error, got a stream"),
    }
}

#[tokio::test]
async fn test_pipeline_over_http() {
    init_logging();
    let server = MockServer::start_async().await;
    let body = [
        json!({"type": "started", "message": "Starting task execution"}),
        json!({"type": "tool_calls_detected", "count": 1, "iteration": 1}),
        json!({
            "type": "tool_started",
            "tool_name": "create_google_doc",
            "input": {"title": "Notes"},
            "iteration": 1
        }),
        json!({
            "type": "tool_completed",
            "tool_name": "create_google_doc",
            "output": "Created document 'Notes'"
        }),
        json!({"type": "final_result", "message": "I created the document."}),
    ]
    .iter()
    .map(|event| format!("data: {event}\n\n"))
    .collect::<String>();

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(STREAM_PATH);
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(body);
        })
        .await;

    let pipeline = ExecutionPipeline::connect(options_for(&server)).unwrap();
    let mut rx = pipeline.subscribe();
    pipeline.start_execution("Create a doc called Notes");

    let snapshot = tokio::time::timeout(
        Duration::from_secs(10),
        rx.wait_for(|s| s.execution_state.final_result.is_some()),
    )
    .await
    .expect("timed out")
    .unwrap()
    .clone();

    mock.assert_async().await;
    assert!(snapshot.execution_state.is_started);
    assert_eq!(
        snapshot.execution_state.final_result.as_deref(),
        Some("I created the document.")
    );
    assert_eq!(snapshot.tool_calls.len(), 1);
    let call = &snapshot.tool_calls[0];
    assert_eq!(call.display_name(), "Create Google Doc");
    assert_eq!(call.raw_input, Some(json!({"title": "Notes"})));
    assert_eq!(call.iteration, Some(1));
    assert_eq!(call.status, ToolCallStatus::Completed);
    assert!(!snapshot.is_executing);
}

#[tokio::test]
async fn test_pipeline_connection_refused() {
    init_logging();
    // nothing listens on the discard port
    let options = PipelineOptions::builder()
        .endpoint("http://127.0.0.1:9")
        .connect_timeout(Duration::from_secs(2))
        .build();
    let pipeline = ExecutionPipeline::connect(options).unwrap();
    let mut rx = pipeline.subscribe();
    pipeline.start_execution("hi");

    let snapshot = tokio::time::timeout(
        Duration::from_secs(10),
        rx.wait_for(|s| s.execution_state.final_result.is_some()),
    )
    .await
    .expect("timed out")
    .unwrap()
    .clone();

    let result = snapshot.execution_state.final_result.unwrap_or_default();
    assert!(result.starts_with("Error: "), "{result}");
    assert!(!snapshot.is_executing);
}
