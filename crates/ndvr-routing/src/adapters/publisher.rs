//! Event publishers for embedders that do not wire their own sink.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ports::{DvEvent, DvEventPublisher};

/// Drops every event, counting them.
#[derive(Debug, Default)]
pub struct NoOpEventPublisher {
    /// Count of published events (for testing verification).
    pub event_count: AtomicUsize,
}

impl NoOpEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_count: AtomicUsize::new(0),
        }
    }

    /// Get the count of published events.
    #[must_use]
    pub fn get_event_count(&self) -> usize {
        self.event_count.load(Ordering::SeqCst)
    }
}

impl DvEventPublisher for NoOpEventPublisher {
    fn publish(&self, _event: DvEvent) -> Result<(), String> {
        self.event_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Keeps every event in memory, in publish order.
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<DvEvent>>,
}

impl InMemoryEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Get all published events.
    #[must_use]
    pub fn get_events(&self) -> Vec<DvEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Clear all stored events.
    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl DvEventPublisher for InMemoryEventPublisher {
    fn publish(&self, event: DvEvent) -> Result<(), String> {
        self.events
            .lock()
            .map_err(|e| format!("event log poisoned: {}", e))?
            .push(event);
        Ok(())
    }
}
