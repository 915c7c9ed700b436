//! Cancelable timers for the engine's single thread of control.
//!
//! The engine never sleeps. It arms timers here, the runtime asks for the
//! next deadline, waits, then hands due timers back to the engine one at a
//! time. A canceled timer is removed outright, so it can never fire.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{RequestId, Timestamp};

/// What a timer does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    /// Broadcast a Hello and re-arm with the current interval
    SendHello,
    /// Re-originate local prefixes and poll every active neighbor
    LocalRtRefresh,
    /// An advertisement request went unanswered
    RequestTimeout(RequestId),
    /// Re-issue an advertisement request to a neighbor
    RetryRequest(String),
    /// Evict neighbors silent for too long
    NeighborSweep,
}

/// Handle for canceling a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Timers ordered by deadline, then by arming order.
#[derive(Debug, Default)]
pub struct EventScheduler {
    queue: BTreeMap<(Timestamp, TimerId), TimerEvent>,
    deadlines: HashMap<TimerId, Timestamp>,
    next_id: u64,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `event` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: Timestamp, event: TimerEvent) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.queue.insert((deadline, id), event);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a timer. Returns false if it already fired or was canceled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer due at `now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(TimerId, TimerEvent)> {
        let (&(deadline, id), _) = self.queue.iter().next()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        self.queue.remove(&(deadline, id)).map(|event| (id, event))
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every timer.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }
}
