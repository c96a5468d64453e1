//! Unit tests for pipeline options

use std::collections::HashMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use task_agent_pipeline::types::options::{
    DEFAULT_MAX_FRAME_SIZE, DEFAULT_MIN_EVENT_DURATION, ENV_CONNECT_TIMEOUT_MS, ENV_ENDPOINT,
    ENV_MAX_FRAME_BYTES, ENV_MIN_EVENT_MS,
};
use task_agent_pipeline::{PipelineError, PipelineOptions};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults() {
    let options = PipelineOptions::default();
    assert_eq!(options.endpoint, "http://localhost:8000");
    assert_eq!(options.min_event_duration, Duration::from_millis(1500));
    assert_eq!(options.min_event_duration, DEFAULT_MIN_EVENT_DURATION);
    assert_eq!(options.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
    assert_eq!(options.connect_timeout, None);
    assert_eq!(
        options.stream_url(),
        "http://localhost:8000/tool-calling/execute-stream"
    );
    assert!(options.validate().is_ok());
}

#[test]
fn test_builder() {
    let options = PipelineOptions::builder()
        .endpoint("https://agent.example.com/")
        .min_event_duration(Duration::from_millis(250))
        .max_frame_size(4096)
        .connect_timeout(Duration::from_secs(3))
        .header("x-app", "desktop")
        .build();

    assert_eq!(options.min_event_duration, Duration::from_millis(250));
    assert_eq!(options.max_frame_size, 4096);
    assert_eq!(options.connect_timeout, Some(Duration::from_secs(3)));
    assert_eq!(options.headers.get("x-app").map(String::as_str), Some("desktop"));
    assert_eq!(
        options.url_for("/core/agent-personality"),
        "https://agent.example.com/core/agent-personality"
    );
}

#[test]
fn test_from_lookup_without_variables_uses_defaults() {
    let options = PipelineOptions::from_lookup(lookup(&[])).unwrap();
    assert_eq!(options.endpoint, "http://localhost:8000");
    assert_eq!(options.min_event_duration, DEFAULT_MIN_EVENT_DURATION);
}

#[test]
fn test_from_lookup_overrides() {
    let options = PipelineOptions::from_lookup(lookup(&[
        (ENV_ENDPOINT, " http://10.0.0.2:8000 "),
        (ENV_MIN_EVENT_MS, "0"),
        (ENV_MAX_FRAME_BYTES, "2048"),
        (ENV_CONNECT_TIMEOUT_MS, "750"),
    ]))
    .unwrap();

    assert_eq!(options.endpoint, "http://10.0.0.2:8000");
    assert_eq!(options.min_event_duration, Duration::ZERO);
    assert_eq!(options.max_frame_size, 2048);
    assert_eq!(options.connect_timeout, Some(Duration::from_millis(750)));
}

#[test]
fn test_from_lookup_rejects_malformed_numbers() {
    let result = PipelineOptions::from_lookup(lookup(&[(ENV_MIN_EVENT_MS, "fast")]));
    match result {
        Err(PipelineError::InvalidConfig(msg)) => assert!(msg.contains(ENV_MIN_EVENT_MS)),
        other => panic!("expected invalid config, got {other:?}"),
    }

    let result = PipelineOptions::from_lookup(lookup(&[(ENV_MAX_FRAME_BYTES, "-1")]));
    assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
}

#[test]
fn test_validate() {
    let empty = PipelineOptions::builder().endpoint("").build();
    assert!(matches!(empty.validate(), Err(PipelineError::InvalidConfig(_))));

    let no_scheme = PipelineOptions::builder().endpoint("localhost:8000").build();
    assert!(matches!(no_scheme.validate(), Err(PipelineError::InvalidConfig(_))));

    let zero_frame = PipelineOptions::builder().max_frame_size(0).build();
    assert!(matches!(zero_frame.validate(), Err(PipelineError::InvalidConfig(_))));

    let zero_frame_env = PipelineOptions::from_lookup(lookup(&[(ENV_MAX_FRAME_BYTES, "0")]));
    assert!(zero_frame_env.is_err());
}

#[test]
fn test_invalid_header_is_rejected_by_transport() {
    let options = PipelineOptions::builder()
        .header("bad header", "value")
        .build();
    let result = task_agent_pipeline::HttpTransport::new(&options);
    assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
}
