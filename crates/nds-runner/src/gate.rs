//! Pause gate: where the execution thread sleeps while it has nothing to run
//!
//! One waiter, any number of signalers. A signaler publishes its state
//! change (an atomic store) and then calls [`PauseGate::notify`]. The waiter
//! evaluates its wake condition while holding the gate lock, and `notify`
//! takes the same lock, so a change published before `notify` is either seen
//! by the condition check or wakes the wait. There is no timeout.

use parking_lot::{Condvar, Mutex};

pub struct PauseGate {
    /// Number of notifications so far
    generation: Mutex<u64>,
    condvar: Condvar,
}

impl PauseGate {
    pub fn new() -> Self {
        Self {
            generation: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    /// Wake the waiter, if any
    pub fn notify(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.condvar.notify_all();
    }

    /// Sleep until notified, unless `ready` already holds.
    ///
    /// Returns `true` if the caller actually slept. Waking does not imply
    /// `ready` now holds; the caller re-evaluates its flags either way.
    pub fn wait_unless<F>(&self, ready: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let mut generation = self.generation.lock();
        if ready() {
            return false;
        }
        let seen = *generation;
        self.condvar.wait(&mut generation);
        tracing::trace!("Pause gate woke (generation {} -> {})", seen, *generation);
        true
    }

    #[cfg(test)]
    pub(crate) fn notifications(&self) -> u64 {
        *self.generation.lock()
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}
