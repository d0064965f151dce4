//! Cancellable repeating timer behind autoplay.
//!
//! The timer never spawns anything: it only records a deadline. The event
//! loop asks how long it may sleep ([`AutoplayTimer::time_until`]) and calls
//! [`AutoplayTimer::fire`] once that deadline passes. At most one schedule is
//! live; starting a new one replaces the old handle, and `cancel` is the only
//! way to drop it.

use std::time::{Duration, Instant};

/// Identity of one armed schedule.
///
/// Handles are never reused, so a handle captured before a cancel can be
/// checked with [`AutoplayTimer::is_live`] and will always read as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: TimerHandle,
    deadline: Instant,
}

/// Repeating timer with a single pending slot.
#[derive(Debug, Clone)]
pub struct AutoplayTimer {
    interval: Duration,
    pending: Option<Pending>,
    next_id: u64,
}

impl AutoplayTimer {
    /// Create an idle timer with the given period.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
            next_id: 0,
        }
    }

    /// Period between firings.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the timer, replacing any schedule that was already pending.
    pub fn start(&mut self, now: Instant) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some(Pending {
            handle,
            deadline: now + self.interval,
        });
        handle
    }

    /// Drop the pending schedule, returning its handle if there was one.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.pending.take().map(|p| p.handle)
    }

    /// Whether a schedule is pending.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `handle` is the schedule currently pending.
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.pending.is_some_and(|p| p.handle == handle)
    }

    /// Deadline of the pending schedule.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Time left before the next firing (zero if already due).
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|p| p.deadline.saturating_duration_since(now))
    }

    /// Fire the pending schedule if its deadline has passed.
    ///
    /// On firing, the same handle is re-armed one interval later. Missed
    /// periods are skipped rather than replayed, so a stalled loop produces a
    /// single firing.
    pub fn fire(&mut self, now: Instant) -> Option<TimerHandle> {
        let pending = self.pending.as_mut()?;
        if now < pending.deadline {
            return None;
        }
        let mut next = pending.deadline + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        pending.deadline = next;
        Some(pending.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_fires_only_after_deadline() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(2 * SECOND);
        let handle = timer.start(t0);

        assert_eq!(timer.fire(t0 + SECOND), None);
        assert_eq!(timer.fire(t0 + 2 * SECOND), Some(handle));
        assert_eq!(timer.deadline(), Some(t0 + 4 * SECOND));
    }

    #[test]
    fn test_restart_replaces_handle() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(SECOND);
        let first = timer.start(t0);
        let second = timer.start(t0);

        assert_ne!(first, second);
        assert!(!timer.is_live(first));
        assert!(timer.is_live(second));
    }

    #[test]
    fn test_cancel_leaves_nothing_to_fire() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(SECOND);
        let handle = timer.start(t0);

        assert_eq!(timer.cancel(), Some(handle));
        assert_eq!(timer.cancel(), None);
        assert_eq!(timer.fire(t0 + 10 * SECOND), None);
        assert!(!timer.is_live(handle));
        assert_eq!(timer.time_until(t0), None);
    }

    #[test]
    fn test_stall_skips_missed_periods() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(SECOND);
        timer.start(t0);

        assert!(timer.fire(t0 + 5 * SECOND).is_some());
        assert_eq!(timer.deadline(), Some(t0 + 6 * SECOND));
        assert_eq!(timer.fire(t0 + 5 * SECOND), None);
    }
}
