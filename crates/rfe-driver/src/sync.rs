//! Wait-slot and subscriber primitives
//!
//! `Latest<T>` holds the most recent value of one message stream. The
//! reader loop publishes into it; callers read snapshots or block for
//! the next value. A sequence counter decides "next": a waiter records
//! the counter at call entry and is released by the first publish
//! strictly after that, so consecutive identical payloads still count
//! as distinct deliveries and no publish can be missed between call
//! entry and the wait. Publishing notifies every waiter (broadcast);
//! each blocking call owns its wait and its deadline.
//!
//! `close()` marks the stream dead (transport gone or handle freed) and
//! wakes everyone so no caller is ever left blocked on a disconnected
//! device.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Why a blocking wait ended without a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitError {
    /// The deadline elapsed first
    TimedOut,
    /// The stream closed: disconnection or handle shutdown
    Closed,
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    seq: u64,
    closed: bool,
}

/// The most recent value of one message stream, plus wait support
#[derive(Debug)]
pub(crate) struct Latest<T> {
    slot: Mutex<Slot<T>>,
    cond: Condvar,
}

impl<T: Clone> Latest<T> {
    pub fn new() -> Self {
        Latest {
            slot: Mutex::new(Slot {
                value: None,
                seq: 0,
                closed: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Replace the stored value and wake every waiter
    pub fn publish(&self, value: T) {
        let mut slot = self.slot.lock().unwrap();
        slot.value = Some(value);
        slot.seq += 1;
        self.cond.notify_all();
    }

    /// Snapshot of the most recent value, if any has ever arrived
    pub fn get(&self) -> Option<T> {
        self.slot.lock().unwrap().value.clone()
    }

    /// The current publish count. Record before issuing a command to
    /// wait for a response published strictly afterwards.
    pub fn seq(&self) -> u64 {
        self.slot.lock().unwrap().seq
    }

    /// Mark the stream dead and wake every waiter
    pub fn close(&self) {
        self.slot.lock().unwrap().closed = true;
        self.cond.notify_all();
    }

    /// Block until a value is published strictly after call entry
    pub fn wait_for_next(&self, timeout: Duration) -> Result<T, WaitError> {
        let entry_seq = self.slot.lock().unwrap().seq;
        self.wait_for_next_after(entry_seq, timeout)
    }

    /// Block until a value is published with a sequence number greater
    /// than `entry_seq`
    pub fn wait_for_next_after(&self, entry_seq: u64, timeout: Duration) -> Result<T, WaitError> {
        self.wait_internal(timeout, |slot| {
            if slot.seq > entry_seq {
                slot.value.clone()
            } else {
                None
            }
        })
    }

    /// Block until the stored value (current or future) satisfies the
    /// predicate. Used for command confirmation: the device may already
    /// be in the requested state.
    pub fn wait_until(
        &self,
        timeout: Duration,
        mut predicate: impl FnMut(&T) -> bool,
    ) -> Result<T, WaitError> {
        self.wait_internal(timeout, |slot| {
            slot.value.as_ref().filter(|v| predicate(v)).cloned()
        })
    }

    fn wait_internal(
        &self,
        timeout: Duration,
        mut ready: impl FnMut(&Slot<T>) -> Option<T>,
    ) -> Result<T, WaitError> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock().unwrap();

        loop {
            if let Some(value) = ready(&slot) {
                return Ok(value);
            }
            if slot.closed {
                return Err(WaitError::Closed);
            }

            // Recompute the remaining time each turn so spurious
            // wakeups can neither extend nor truncate the deadline
            let now = Instant::now();
            if now >= deadline {
                return Err(WaitError::TimedOut);
            }
            slot = self.cond.wait_timeout(slot, deadline - now).unwrap().0;
        }
    }
}

impl<T: Clone> Default for Latest<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The single registered callback for one message stream
///
/// Registering replaces the previous callback atomically; removing
/// clears it. At most one subscriber per stream at a time.
pub(crate) struct CallbackSlot<T> {
    callback: Mutex<Option<Box<dyn FnMut(T) + Send>>>,
}

impl<T> CallbackSlot<T> {
    pub fn new() -> Self {
        CallbackSlot {
            callback: Mutex::new(None),
        }
    }

    pub fn set(&self, callback: impl FnMut(T) + Send + 'static) {
        *self.callback.lock().unwrap() = Some(Box::new(callback));
    }

    pub fn clear(&self) {
        *self.callback.lock().unwrap() = None;
    }

    /// Invoke the current callback, if one is registered. Runs on the
    /// caller's (the reader loop's) thread.
    pub fn invoke(&self, value: T) {
        if let Some(callback) = self.callback.lock().unwrap().as_mut() {
            callback(value);
        }
    }
}

impl<T> Default for CallbackSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for CallbackSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered = self.callback.lock().unwrap().is_some();
        f.debug_struct("CallbackSlot")
            .field("registered", &registered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_returns_latest_snapshot() {
        let latest = Latest::new();
        assert_eq!(latest.get(), None);

        latest.publish(1);
        latest.publish(2);
        assert_eq!(latest.get(), Some(2));
    }

    #[test]
    fn test_wait_for_next_ignores_preexisting_value() {
        let latest = Latest::new();
        latest.publish(1);

        // The value published before call entry must not satisfy the
        // wait
        assert_eq!(
            latest.wait_for_next(Duration::from_millis(20)),
            Err(WaitError::TimedOut)
        );
    }

    #[test]
    fn test_wait_for_next_sees_identical_payload() {
        let latest = Arc::new(Latest::new());
        latest.publish(7);

        let waiter = {
            let latest = Arc::clone(&latest);
            thread::spawn(move || latest.wait_for_next(Duration::from_secs(5)))
        };

        // Publishing the same payload again still counts as a new
        // delivery
        thread::sleep(Duration::from_millis(20));
        latest.publish(7);
        assert_eq!(waiter.join().unwrap(), Ok(7));
    }

    #[test]
    fn test_broadcast_wakes_every_waiter() {
        let latest: Arc<Latest<u32>> = Arc::new(Latest::new());

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let latest = Arc::clone(&latest);
                thread::spawn(move || latest.wait_for_next(Duration::from_secs(5)))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        latest.publish(42);

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), Ok(42));
        }
    }

    #[test]
    fn test_close_releases_waiters() {
        let latest: Arc<Latest<u32>> = Arc::new(Latest::new());

        let waiter = {
            let latest = Arc::clone(&latest);
            thread::spawn(move || latest.wait_for_next(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(20));
        latest.close();
        assert_eq!(waiter.join().unwrap(), Err(WaitError::Closed));
    }

    #[test]
    fn test_timeout_is_not_cut_short() {
        let latest: Latest<u32> = Latest::new();
        let start = Instant::now();
        let result = latest.wait_for_next(Duration::from_millis(50));
        assert_eq!(result, Err(WaitError::TimedOut));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_wait_until_accepts_current_value() {
        let latest = Latest::new();
        latest.publish(10);

        // Already-satisfied predicates return without waiting
        let result = latest.wait_until(Duration::from_secs(5), |&v| v == 10);
        assert_eq!(result, Ok(10));
    }

    #[test]
    fn test_wait_until_skips_non_matching_values() {
        let latest = Arc::new(Latest::new());

        let waiter = {
            let latest = Arc::clone(&latest);
            thread::spawn(move || latest.wait_until(Duration::from_secs(5), |&v| v >= 3))
        };

        thread::sleep(Duration::from_millis(20));
        latest.publish(1);
        latest.publish(2);
        latest.publish(3);
        assert_eq!(waiter.join().unwrap(), Ok(3));
    }

    #[test]
    fn test_callback_slot_replace_and_clear() {
        let slot: CallbackSlot<u32> = CallbackSlot::new();
        let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        slot.set(move |v| sink.lock().unwrap().push(v));
        slot.invoke(1);

        // Registering a new callback replaces the old one
        let sink = Arc::clone(&seen);
        slot.set(move |v| sink.lock().unwrap().push(v * 10));
        slot.invoke(2);

        slot.clear();
        slot.invoke(3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 20]);
    }
}
