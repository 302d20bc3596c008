//! Survival score: one point per period while running

use super::schedule::{Scheduler, TimerHandle};

#[derive(Debug, Clone)]
pub struct ScoreTracker {
    score: u64,
    period_ms: u64,
    timer: Option<TimerHandle>,
}

impl ScoreTracker {
    pub fn new(period_ms: u64) -> Self {
        Self {
            score: 0,
            period_ms,
            timer: None,
        }
    }

    /// Reset to zero and begin ticking
    pub fn start(&mut self, scheduler: &mut Scheduler) {
        self.stop(scheduler);
        self.score = 0;
        self.timer = Some(scheduler.every(self.period_ms));
    }

    /// Stop ticking. Safe to call when already stopped.
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
    }

    pub fn current(&self) -> u64 {
        self.score
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether `handle` is this tracker's timer
    pub fn owns(&self, handle: TimerHandle) -> bool {
        self.timer == Some(handle)
    }

    /// Periodic callback. Returns the new score, or None when stopped.
    pub fn on_tick(&mut self) -> Option<u64> {
        self.timer?;
        self.score += 1;
        Some(self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tracker: &mut ScoreTracker, scheduler: &mut Scheduler, until_ms: u64) {
        while let Some(handle) = scheduler.poll(until_ms) {
            if tracker.owns(handle) {
                tracker.on_tick();
            }
        }
        scheduler.settle(until_ms);
    }

    #[test]
    fn test_counts_one_per_period() {
        let mut scheduler = Scheduler::new();
        let mut tracker = ScoreTracker::new(1000);
        tracker.start(&mut scheduler);

        run(&mut tracker, &mut scheduler, 999);
        assert_eq!(tracker.current(), 0);
        run(&mut tracker, &mut scheduler, 3500);
        assert_eq!(tracker.current(), 3);
    }

    #[test]
    fn test_stop_is_idempotent_and_freezes() {
        let mut scheduler = Scheduler::new();
        let mut tracker = ScoreTracker::new(1000);
        tracker.start(&mut scheduler);
        run(&mut tracker, &mut scheduler, 2000);

        tracker.stop(&mut scheduler);
        tracker.stop(&mut scheduler);
        assert!(!tracker.is_running());
        assert_eq!(scheduler.active_count(), 0);

        run(&mut tracker, &mut scheduler, 10_000);
        assert_eq!(tracker.current(), 2);
        assert_eq!(tracker.on_tick(), None);
    }

    #[test]
    fn test_start_resets() {
        let mut scheduler = Scheduler::new();
        let mut tracker = ScoreTracker::new(1000);
        tracker.start(&mut scheduler);
        run(&mut tracker, &mut scheduler, 5000);
        assert_eq!(tracker.current(), 5);

        tracker.start(&mut scheduler);
        assert_eq!(tracker.current(), 0);
        assert_eq!(scheduler.active_count(), 1);
    }
}
