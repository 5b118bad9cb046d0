//! Tick-driven scheduler for fire-once delayed events.
//!
//! Events are scheduled a number of ticks ahead and are returned by
//! [`Scheduler::tick`] exactly once when their delay has elapsed, unless they
//! were cancelled through their [`TimerHandle`] first.

/// Identifies a scheduled event for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Pending<E> {
    handle: TimerHandle,
    remaining: u32,
    event: E,
}

/// Queue of pending delayed events.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Schedules `event` to fire on the `delay`-th following call to
    /// [`Scheduler::tick`]. Delays of zero and one both fire on the next call.
    pub fn schedule(&mut self, delay: u32, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            remaining: delay,
            event,
        });
        handle
    }

    /// Cancels a pending event. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Cancels every pending event.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Whether the event behind `handle` is still waiting.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Whether any event is waiting.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Ticks left before the event behind `handle` fires.
    pub fn remaining(&self, handle: TimerHandle) -> Option<u32> {
        self.pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.remaining)
    }

    /// Advances time by one tick and returns the events that fire, in
    /// scheduling order.
    pub fn tick(&mut self) -> Vec<E> {
        let mut fired = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for mut pending in self.pending.drain(..) {
            if pending.remaining <= 1 {
                fired.push(pending.event);
            } else {
                pending.remaining -= 1;
                waiting.push(pending);
            }
        }
        self.pending = waiting;
        fired
    }
}
