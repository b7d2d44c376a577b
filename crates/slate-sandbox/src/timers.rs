//! Tracked timer, interval, and animation-frame handles
//!
//! Every handle handed to a script is recorded here at creation and removed
//! by the script's own cancel call; whatever remains is forcibly cancelled
//! on termination. Cancelling an unknown handle is a safe no-op.

use rhai::FnPtr;

/// Handle returned to scripts by the timer and frame capabilities
pub type TimerHandle = u64;

#[derive(Clone, Debug)]
struct TimerEntry {
    handle: TimerHandle,
    /// Host-clock time at which the callback becomes runnable
    due_ms: u64,
    /// Repeat period; `None` for one-shot timeouts
    period_ms: Option<u64>,
    callback: FnPtr,
}

/// Pending timeouts and intervals for one sandbox.
#[derive(Clone, Debug)]
pub struct TimerWheel {
    entries: Vec<TimerEntry>,
    next_handle: TimerHandle,
}

impl Default for TimerWheel {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerWheel {
    /// Create an empty wheel.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 1,
        }
    }

    fn alloc_handle(&mut self) -> TimerHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    /// Register a one-shot timeout.
    pub fn insert_timeout(&mut self, callback: FnPtr, delay_ms: u64, now_ms: u64) -> TimerHandle {
        let handle = self.alloc_handle();
        self.entries.push(TimerEntry {
            handle,
            due_ms: now_ms.saturating_add(delay_ms),
            period_ms: None,
            callback,
        });
        handle
    }

    /// Register a repeating interval. A zero period is bumped to one
    /// millisecond so the entry cannot become due forever within one tick.
    pub fn insert_interval(&mut self, callback: FnPtr, period_ms: u64, now_ms: u64) -> TimerHandle {
        let handle = self.alloc_handle();
        let period = period_ms.max(1);
        self.entries.push(TimerEntry {
            handle,
            due_ms: now_ms.saturating_add(period),
            period_ms: Some(period),
            callback,
        });
        handle
    }

    /// Cancel a handle. Unknown handles are ignored.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|e| e.handle != handle);
    }

    /// Remove and return the earliest entry due at `now_ms`, if any.
    ///
    /// Intervals are rescheduled for `now_ms + period` before the callback
    /// is returned, so they fire at most once per dispatch pass but keep
    /// their handle for later cancellation.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerHandle, FnPtr)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.handle))
            .map(|(i, _)| i)?;

        let handle = self.entries[index].handle;
        let callback = self.entries[index].callback.clone();
        match self.entries[index].period_ms {
            Some(period) => self.entries[index].due_ms = now_ms.saturating_add(period),
            None => {
                self.entries.remove(index);
            }
        }
        Some((handle, callback))
    }

    /// Earliest due time among pending entries.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending entry.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }
}

/// Pending animation-frame callbacks for one sandbox.
///
/// A frame callback runs once on the next frame pass; callbacks requested
/// during a pass land in the following one.
#[derive(Clone, Debug)]
pub struct FrameQueue {
    entries: Vec<(TimerHandle, FnPtr)>,
    next_handle: TimerHandle,
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 1,
        }
    }

    /// Queue a callback for the next frame pass.
    pub fn insert(&mut self, callback: FnPtr) -> TimerHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.entries.push((handle, callback));
        handle
    }

    /// Cancel a queued frame. Unknown handles are ignored.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|(h, _)| *h != handle);
    }

    /// Handles queued right now, in request order.
    pub fn handles(&self) -> Vec<TimerHandle> {
        self.entries.iter().map(|(h, _)| *h).collect()
    }

    /// Remove a specific queued frame, returning its callback.
    ///
    /// Returns `None` when the frame was cancelled in the meantime.
    pub fn take(&mut self, handle: TimerHandle) -> Option<FnPtr> {
        let index = self.entries.iter().position(|(h, _)| *h == handle)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of queued frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every queued frame.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback() -> FnPtr {
        FnPtr::new("cb").unwrap()
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut wheel = TimerWheel::new();
        wheel.insert_timeout(callback(), 100, 0);

        assert!(wheel.pop_due(50).is_none());
        assert!(wheel.pop_due(100).is_some());
        assert!(wheel.pop_due(10_000).is_none());
        assert!(wheel.is_empty());
    }

    #[test]
    fn test_interval_reschedules_and_keeps_handle() {
        let mut wheel = TimerWheel::new();
        let handle = wheel.insert_interval(callback(), 10, 0);

        let (h, _) = wheel.pop_due(10).unwrap();
        assert_eq!(h, handle);
        // Rescheduled, not yet due again within the same pass.
        assert!(wheel.pop_due(10).is_none());
        assert!(wheel.pop_due(20).is_some());

        wheel.cancel(handle);
        assert!(wheel.pop_due(1_000_000).is_none());
    }

    #[test]
    fn test_due_order_is_deadline_then_handle() {
        let mut wheel = TimerWheel::new();
        let late = wheel.insert_timeout(callback(), 200, 0);
        let early = wheel.insert_timeout(callback(), 100, 0);

        assert_eq!(wheel.pop_due(500).unwrap().0, early);
        assert_eq!(wheel.pop_due(500).unwrap().0, late);
    }

    #[test]
    fn test_cancel_unknown_handle_is_noop() {
        let mut wheel = TimerWheel::new();
        wheel.insert_timeout(callback(), 10, 0);
        wheel.cancel(999);
        assert_eq!(wheel.len(), 1);
    }

    #[test]
    fn test_cancel_all() {
        let mut wheel = TimerWheel::new();
        wheel.insert_timeout(callback(), 10, 0);
        wheel.insert_interval(callback(), 10, 0);
        wheel.cancel_all();
        assert!(wheel.is_empty());
    }

    #[test]
    fn test_frame_queue_take_respects_cancellation() {
        let mut queue = FrameQueue::new();
        let first = queue.insert(callback());
        let second = queue.insert(callback());

        queue.cancel(first);
        assert!(queue.take(first).is_none());
        assert!(queue.take(second).is_some());
        assert!(queue.is_empty());
    }
}
