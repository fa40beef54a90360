use std::time::Duration;

use serde::{Deserialize, Serialize};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Virtual clock that drives scheduled tasks. It only moves when told to.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    elapsed: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.elapsed
    }

    pub fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

/// Handle to a recurring task. There is exactly one owner; dropping the
/// handle out of play goes through [`ScheduledTask::cancel`].
#[derive(Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    id: TaskId,
    period: Duration,
    next_due: Duration,
}

impl ScheduledTask {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Duration {
        self.next_due
    }

    /// Consumes one due firing, if any, and re-arms for the next period.
    /// Call repeatedly to drain every firing that fell inside a long step.
    pub fn poll(&mut self, now: Duration) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        true
    }

    pub fn cancel(self) -> TaskId {
        tracing::trace!(task = self.id.0, "cancelled scheduled task");
        self.id
    }
}

/// Issues recurring tasks against a [`PlaybackClock`].
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a task whose first firing is one `period` after `now`.
    pub fn schedule_repeating(&mut self, now: Duration, period: Duration) -> ScheduledTask {
        let period = period.max(MIN_PERIOD);
        let id = TaskId(self.next_id);
        self.next_id += 1;
        tracing::trace!(task = id.0, ?period, "scheduled recurring task");

        ScheduledTask {
            id,
            period,
            next_due: now + period,
        }
    }
}
