//! Stop-signal primitive shared between the control-dispatch thread and
//! the service's main thread.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Cloneable handle to a set-once flag with blocking wait.
///
/// Created unset when the service is constructed; set exactly once when the
/// OS requests a stop. A long-running service blocks on [`StopSignal::wait`]
/// from its start hook, and the stop path wakes it after cleanup has run.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

struct Inner {
    stopped: Mutex<bool>,
    cond: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                stopped: Mutex::new(false),
                cond: Condvar::new(),
            }),
        }
    }

    /// Set the signal and wake every waiter. Idempotent.
    pub fn set(&self) {
        let mut stopped = self.inner.stopped.lock().expect("stop flag lock poisoned");
        *stopped = true;
        self.inner.cond.notify_all();
    }

    pub fn is_set(&self) -> bool {
        *self.inner.stopped.lock().expect("stop flag lock poisoned")
    }

    /// Block until the signal is set.
    pub fn wait(&self) {
        let mut stopped = self.inner.stopped.lock().expect("stop flag lock poisoned");
        while !*stopped {
            stopped = self
                .inner
                .cond
                .wait(stopped)
                .expect("stop flag lock poisoned");
        }
    }

    /// Block for at most `timeout`. Returns true if the signal was set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut stopped = self.inner.stopped.lock().expect("stop flag lock poisoned");
        while !*stopped {
            let (guard, result) = self
                .inner
                .cond
                .wait_timeout(stopped, timeout)
                .expect("stop flag lock poisoned");
            stopped = guard;
            if result.timed_out() {
                return *stopped;
            }
        }
        true
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_starts_unset() {
        let signal = StopSignal::new();
        assert!(!signal.is_set());
    }

    #[test]
    fn test_set_is_observable_and_idempotent() {
        let signal = StopSignal::new();
        signal.set();
        signal.set();
        assert!(signal.is_set());
        // A wait after set returns immediately.
        signal.wait();
    }

    #[test]
    fn test_wait_timeout_expires_when_unset() {
        let signal = StopSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_set_unblocks_waiting_thread() {
        let signal = StopSignal::new();
        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || {
                signal.wait();
                signal.is_set()
            })
        };
        thread::sleep(Duration::from_millis(20));
        signal.set();
        assert!(waiter.join().unwrap());
    }
}
