//! Hello interval back-off.

/// Current Hello interval, always within `[initial, max]`.
///
/// Doubles (capped at `max`) after each Hello sent on a stable topology and
/// snaps back to `initial` whenever the topology changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelloSchedule {
    initial_secs: u64,
    max_secs: u64,
    current_secs: u64,
}

impl HelloSchedule {
    /// `max` is raised to `initial` if it is smaller.
    pub fn new(initial_secs: u64, max_secs: u64) -> Self {
        let initial_secs = initial_secs.max(1);
        Self {
            initial_secs,
            max_secs: max_secs.max(initial_secs),
            current_secs: initial_secs,
        }
    }

    pub fn current_secs(&self) -> u64 {
        self.current_secs
    }

    pub fn initial_secs(&self) -> u64 {
        self.initial_secs
    }

    pub fn max_secs(&self) -> u64 {
        self.max_secs
    }

    /// Back off one step. Returns the new interval.
    pub fn increase(&mut self) -> u64 {
        self.current_secs = self.current_secs.saturating_mul(2).min(self.max_secs);
        self.current_secs
    }

    /// Back to the initial interval. Returns true if it was above it.
    pub fn reset(&mut self) -> bool {
        let changed = self.current_secs != self.initial_secs;
        self.current_secs = self.initial_secs;
        changed
    }
}
