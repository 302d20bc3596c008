//! Deterministic timer scheduler
//!
//! Stands in for `setInterval`/`setTimeout`: the host advances virtual time,
//! and due timers are handed back one at a time in due order so that a
//! cancellation made while handling one firing is seen by the next.

/// Cancellation token for a registered timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u32);

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    due_ms: u64,
    /// `Some(period)` for repeating timers
    period_ms: Option<u64>,
}

/// Virtual clock with periodic and one-shot timers
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    timers: Vec<Timer>,
    next_id: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Register a repeating timer. First firing is one period from now.
    pub fn every(&mut self, period_ms: u64) -> TimerHandle {
        let period_ms = period_ms.max(1);
        self.register(period_ms, Some(period_ms))
    }

    /// Register a one-shot timer
    pub fn after(&mut self, delay_ms: u64) -> TimerHandle {
        self.register(delay_ms, None)
    }

    fn register(&mut self, delay_ms: u64, period_ms: Option<u64>) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
        });
        handle
    }

    /// Cancel a timer. Returns false if it had already fired or been cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Number of live timers
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Ties fire in registration order.
    pub fn poll(&mut self, until_ms: u64) -> Option<TimerHandle> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.handle.0))
            .map(|(i, _)| i)?;

        let Timer {
            handle,
            due_ms,
            period_ms,
        } = self.timers[index].clone();
        self.now_ms = self.now_ms.max(due_ms);

        match period_ms {
            Some(period) => self.timers[index].due_ms = due_ms.saturating_add(period),
            None => {
                self.timers.swap_remove(index);
            }
        }

        Some(handle)
    }

    /// Move the clock to `until_ms` once every due timer has been polled
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
