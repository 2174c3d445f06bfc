//! Call wrappers applied around the service lifecycle entry points:
//! entry/exit tracing and log-and-swallow error containment.

use anyhow::Result;
use log::{debug, error};
use std::fmt;

/// Run `f`, logging entry (with `args`) and exit (with the result) at debug
/// level. Nothing is caught: a panic from `f` propagates unchanged.
pub fn traced<A, R, F>(name: &str, args: A, f: F) -> R
where
    A: fmt::Debug,
    R: fmt::Debug,
    F: FnOnce() -> R,
{
    debug!("> {} args={:?}", name, args);
    let result = f();
    debug!("< {} result={:?}", name, result);
    result
}

/// Run `f` and swallow any error after logging it once at error level.
///
/// The lifecycle entry points must never fail past the control-dispatch
/// boundary; a broken hook is visible only in the log.
pub fn guarded<R, F>(name: &str, f: F) -> Option<R>
where
    F: FnOnce() -> Result<R>,
{
    match f() {
        Ok(value) => Some(value),
        Err(e) => {
            error!("An error occurred while calling {}: {:#}", name, e);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod testlog {
    //! Capturing logger for tests that assert on emitted records.
    //!
    //! `log::set_logger` is process-global, so every test that inspects
    //! records must hold the guard from [`exclusive`] and clear the buffer
    //! before acting.

    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::{Mutex, MutexGuard, Once};

    pub struct Capture {
        records: Mutex<Vec<(Level, String)>>,
    }

    impl Capture {
        pub fn clear(&self) {
            self.records.lock().unwrap().clear();
        }

        pub fn records(&self) -> Vec<(Level, String)> {
            self.records.lock().unwrap().clone()
        }

        pub fn at_level(&self, level: Level) -> Vec<String> {
            self.records()
                .into_iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m)
                .collect()
        }
    }

    impl Log for Capture {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), format!("{}", record.args())));
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture {
        records: Mutex::new(Vec::new()),
    };

    static GUARD: Mutex<()> = Mutex::new(());

    /// Install the capturing logger (once per process) and take the lock
    /// serializing log-asserting tests.
    pub fn exclusive() -> (MutexGuard<'static, ()>, &'static Capture) {
        static INSTALL: Once = Once::new();
        INSTALL.call_once(|| {
            log::set_logger(&CAPTURE).expect("capture logger already set");
            log::set_max_level(LevelFilter::Debug);
        });
        let guard = GUARD.lock().unwrap_or_else(|e| e.into_inner());
        (guard, &CAPTURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_traced_passes_value_through_and_logs_twice() {
        let (_guard, capture) = testlog::exclusive();
        capture.clear();

        let result = traced("double", 21, || 21 * 2);
        assert_eq!(result, 42);

        let records = capture.at_level(Level::Debug);
        assert_eq!(records.len(), 2);
        assert!(records[0].contains("double") && records[0].contains("21"));
        assert!(records[1].contains("double") && records[1].contains("42"));
    }

    #[test]
    fn test_traced_does_not_catch_panics() {
        let (_guard, capture) = testlog::exclusive();
        capture.clear();

        let panicked = std::panic::catch_unwind(|| {
            traced("boom", (), || -> () { panic!("boom") });
        })
        .is_err();
        assert!(panicked);

        // Only the entry line is guaranteed.
        let records = capture.at_level(Level::Debug);
        assert_eq!(records.len(), 1);
        assert!(records[0].contains("boom"));
    }

    #[test]
    fn test_guarded_success_is_silent() {
        let (_guard, capture) = testlog::exclusive();
        capture.clear();

        let result = guarded("fine", || Ok(7));
        assert_eq!(result, Some(7));
        assert!(capture.at_level(Level::Error).is_empty());
    }

    #[test]
    fn test_guarded_failure_swallows_and_logs_once() {
        let (_guard, capture) = testlog::exclusive();
        capture.clear();

        let result: Option<()> = guarded("broken", || Err(anyhow::anyhow!("no such device")));
        assert_eq!(result, None);

        let errors = capture.at_level(Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("broken"));
        assert!(errors[0].contains("no such device"));
    }
}
