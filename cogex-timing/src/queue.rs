use crate::timer::Timer;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// One-shot timer registry. The host reports expiry back to whoever scheduled.
pub trait TimerService {
    fn schedule(&mut self, delay: Duration) -> TimerHandle;
    fn cancel_all(&mut self);
}

/// Pending one-shot timers ordered by due time on clock `C`.
#[derive(Debug, Clone)]
pub struct TimerQueue<C: Timer<Timestamp = u64>> {
    clock: C,
    next_id: u64,
    pending: BinaryHeap<Reverse<(u64, TimerHandle)>>,
}

impl<C: Timer<Timestamp = u64>> TimerQueue<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            next_id: 0,
            pending: BinaryHeap::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Timestamp of the earliest pending timer.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.peek().map(|Reverse((due, _))| *due)
    }

    /// Removes and returns every timer due at the clock's current time, earliest first.
    pub fn take_due(&mut self) -> Vec<TimerHandle> {
        let now = self.clock.now();
        let mut due = Vec::new();
        while let Some(Reverse((at, handle))) = self.pending.peek().copied() {
            if at > now {
                break;
            }
            self.pending.pop();
            due.push(handle);
        }
        due
    }
}

impl<C: Timer<Timestamp = u64>> TimerService for TimerQueue<C> {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let delay_ns = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
        let due = self.clock.now().saturating_add(delay_ns);
        self.pending.push(Reverse((due, handle)));
        debug!(?handle, due_ns = due, "timer scheduled");
        handle
    }

    fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            debug!(count = self.pending.len(), "timers cancelled");
        }
        self.pending.clear();
    }
}
