//! Unit tests for the pacing queue
//!
//! Time is passed in explicitly, so these tests never sleep

use std::time::Duration;

use pretty_assertions::assert_eq;
use task_agent_pipeline::{Admission, ExecutionEvent, PacingQueue};
use tokio::time::Instant;

const MIN: Duration = Duration::from_millis(1500);

fn started() -> ExecutionEvent {
    ExecutionEvent::started()
}

fn tool(name: &str) -> ExecutionEvent {
    ExecutionEvent::tool_started(name, None)
}

#[test]
fn test_first_event_is_immediate() {
    let mut queue = PacingQueue::new(MIN);
    let t0 = Instant::now();

    assert_eq!(queue.enqueue(started(), t0), Admission::Immediate(started()));
    assert!(queue.is_empty());
    assert_eq!(queue.deadline(), None);
    assert_eq!(queue.last_delivery(), Some(t0));
}

#[test]
fn test_burst_is_spaced_out() {
    let mut queue = PacingQueue::new(MIN);
    let t0 = Instant::now();

    assert!(matches!(queue.enqueue(started(), t0), Admission::Immediate(_)));
    assert_eq!(
        queue.enqueue(tool("a"), t0),
        Admission::Queued {
            pending: 1,
            deadline: t0 + MIN
        }
    );
    assert_eq!(
        queue.enqueue(tool("b"), t0),
        Admission::Queued {
            pending: 2,
            deadline: t0 + MIN
        }
    );

    // nothing is due before the deadline
    assert_eq!(queue.poll(t0 + Duration::from_millis(1499)), None);

    assert_eq!(queue.poll(t0 + MIN), Some(tool("a")));
    assert_eq!(queue.deadline(), Some(t0 + MIN * 2));
    assert_eq!(queue.poll(t0 + MIN), None);

    assert_eq!(queue.poll(t0 + MIN * 2), Some(tool("b")));
    assert_eq!(queue.deadline(), None);
    assert!(queue.is_empty());
}

#[test]
fn test_late_poll_spaces_from_actual_delivery() {
    let mut queue = PacingQueue::new(MIN);
    let t0 = Instant::now();

    queue.enqueue(started(), t0);
    queue.enqueue(tool("a"), t0);
    queue.enqueue(tool("b"), t0);

    let late = t0 + Duration::from_millis(2000);
    assert_eq!(queue.poll(late), Some(tool("a")));
    assert_eq!(queue.deadline(), Some(late + MIN));
}

#[test]
fn test_event_after_idle_gap_is_immediate() {
    let mut queue = PacingQueue::new(MIN);
    let t0 = Instant::now();

    queue.enqueue(started(), t0);
    let later = t0 + Duration::from_secs(5);
    assert_eq!(queue.enqueue(tool("a"), later), Admission::Immediate(tool("a")));
}

#[test]
fn test_event_within_interval_waits_for_remainder() {
    let mut queue = PacingQueue::new(MIN);
    let t0 = Instant::now();

    queue.enqueue(started(), t0);
    let t1 = t0 + Duration::from_millis(500);
    assert_eq!(
        queue.enqueue(tool("a"), t1),
        Admission::Queued {
            pending: 1,
            deadline: t0 + MIN
        }
    );
}

#[test]
fn test_error_bypasses_queue() {
    let mut queue = PacingQueue::new(MIN);
    let t0 = Instant::now();

    queue.enqueue(started(), t0);
    queue.enqueue(tool("a"), t0);

    let error = ExecutionEvent::error("boom");
    assert_eq!(queue.enqueue(error.clone(), t0), Admission::Bypass(error));
    // buffered events are left for the caller to discard
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.deadline(), Some(t0 + MIN));
}

#[test]
fn test_order_is_preserved() {
    let mut queue = PacingQueue::new(MIN);
    let t0 = Instant::now();
    let names = ["a", "b", "c", "d"];

    let mut delivered = Vec::new();
    for name in names {
        if let Some(event) = queue.enqueue(tool(name), t0).into_deliverable() {
            delivered.push(event);
        }
    }

    let mut now = t0;
    while let Some(deadline) = queue.deadline() {
        now = deadline;
        delivered.extend(queue.poll(now));
    }

    assert_eq!(delivered, names.map(tool).to_vec());
    assert_eq!(now, t0 + MIN * 3);
}

#[test]
fn test_reset_clears_buffer_and_deadline() {
    let mut queue = PacingQueue::new(MIN);
    let t0 = Instant::now();

    queue.enqueue(started(), t0);
    queue.enqueue(tool("a"), t0);
    queue.reset();

    assert!(queue.is_empty());
    assert_eq!(queue.deadline(), None);
    assert_eq!(queue.last_delivery(), None);
    assert_eq!(queue.poll(t0 + MIN * 10), None);

    // a fresh session starts with an immediate delivery
    assert_eq!(queue.enqueue(tool("b"), t0), Admission::Immediate(tool("b")));
}

#[test]
fn test_zero_interval_delivers_everything_immediately() {
    let mut queue = PacingQueue::new(Duration::ZERO);
    let t0 = Instant::now();

    for name in ["a", "b", "c"] {
        assert_eq!(queue.enqueue(tool(name), t0), Admission::Immediate(tool(name)));
    }
    assert_eq!(queue.min_event_duration(), Duration::ZERO);
}
