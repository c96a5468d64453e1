//! Pacing queue for decoded events
//!
//! Events from the backend arrive in bursts. The queue spreads them out so
//! that every delivered event stays visible for at least
//! `min_event_duration`, without reordering or dropping anything. `error`
//! events skip the queue entirely.
//!
//! The queue owns no timer. It exposes the instant of its next delivery via
//! [`PacingQueue::deadline`] and is driven by calling [`PacingQueue::poll`]
//! with the current time, so the same code runs under a real or virtual clock.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::events::ExecutionEvent;

/// Outcome of handing an event to the queue
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// Urgent event; deliver now, buffered events stay queued
    Bypass(ExecutionEvent),
    /// The queue was idle long enough; deliver now
    Immediate(ExecutionEvent),
    /// Buffered until the returned deadline or later
    Queued {
        /// Number of events waiting, including this one
        pending: usize,
        /// When the next delivery is due
        deadline: Instant,
    },
}

impl Admission {
    /// The event to deliver right away, if any
    #[must_use]
    pub fn into_deliverable(self) -> Option<ExecutionEvent> {
        match self {
            Self::Bypass(event) | Self::Immediate(event) => Some(event),
            Self::Queued { .. } => None,
        }
    }
}

#[derive(Debug)]
struct QueuedEvent {
    event: ExecutionEvent,
    enqueued_at: Instant,
}

/// FIFO buffer that releases events no faster than one per interval
#[derive(Debug)]
pub struct PacingQueue {
    min_event_duration: Duration,
    buffer: VecDeque<QueuedEvent>,
    last_delivery: Option<Instant>,
    /// Armed whenever the buffer is non-empty
    deadline: Option<Instant>,
}

impl PacingQueue {
    /// Create an empty queue
    #[must_use]
    pub const fn new(min_event_duration: Duration) -> Self {
        Self {
            min_event_duration,
            buffer: VecDeque::new(),
            last_delivery: None,
            deadline: None,
        }
    }

    /// Configured minimum spacing between deliveries
    #[must_use]
    pub const fn min_event_duration(&self) -> Duration {
        self.min_event_duration
    }

    /// Hand an event to the queue at time `now`
    pub fn enqueue(&mut self, event: ExecutionEvent, now: Instant) -> Admission {
        if event.is_urgent() {
            log::debug!(
                "Pacing bypass for {} event, {} still queued",
                event.kind(),
                self.buffer.len()
            );
            return Admission::Bypass(event);
        }

        self.buffer.push_back(QueuedEvent {
            event,
            enqueued_at: now,
        });

        if let Some(deadline) = self.deadline {
            log::debug!("Delivery already scheduled, {} queued", self.buffer.len());
            return Admission::Queued {
                pending: self.buffer.len(),
                deadline,
            };
        }

        let due = self
            .last_delivery
            .map_or(now, |last| last + self.min_event_duration);

        if due <= now {
            if let Some(event) = self.pop(now) {
                return Admission::Immediate(event);
            }
        }

        log::debug!(
            "Scheduling delivery in {:?}",
            due.saturating_duration_since(now)
        );
        self.deadline = Some(due);
        Admission::Queued {
            pending: self.buffer.len(),
            deadline: due,
        }
    }

    /// Release the next event if its delivery is due at `now`
    pub fn poll(&mut self, now: Instant) -> Option<ExecutionEvent> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.pop(now)
            }
            _ => None,
        }
    }

    /// Drop all buffered events and forget the last delivery
    pub fn reset(&mut self) {
        if !self.buffer.is_empty() {
            log::debug!("Pacing reset discarded {} queued events", self.buffer.len());
        }
        self.buffer.clear();
        self.deadline = None;
        self.last_delivery = None;
    }

    /// When the next buffered event is due, if any
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// When the last event was delivered
    #[must_use]
    pub const fn last_delivery(&self) -> Option<Instant> {
        self.last_delivery
    }

    /// Number of buffered events
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing is buffered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn pop(&mut self, now: Instant) -> Option<ExecutionEvent> {
        let QueuedEvent { event, enqueued_at } = self.buffer.pop_front()?;
        self.last_delivery = Some(now);
        if !self.buffer.is_empty() {
            self.deadline = Some(now + self.min_event_duration);
        }
        log::debug!(
            "Delivering {} event after {:?} in queue, {} remaining",
            event.kind(),
            now.saturating_duration_since(enqueued_at),
            self.buffer.len()
        );
        Some(event)
    }
}
