//! Process-wide logging initialization.
//!
//! Must run before any service code; `main` calls it first thing, and the
//! Windows service entry calls it again because the SCM invokes that entry
//! on its own thread. Repeated calls are harmless.

use std::env;

/// Initialize `env_logger`, defaulting `RUST_LOG` to `info` when unset.
pub fn init() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    let _ = env_logger::try_init();
}
