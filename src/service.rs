//! Service lifecycle wiring: the hook trait concrete services implement,
//! the per-instance context those hooks see, and the host that maps OS
//! control requests onto them.

use crate::config::ServiceConfig;
use crate::signal::StopSignal;
use crate::status::{ServiceState, StatusReporter};
use crate::trace::{guarded, traced};
use anyhow::Result;
use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

/// The two lifecycle hooks a concrete service implements.
///
/// `start` runs once per activation on the main thread. A long-running
/// service blocks there on [`ServiceContext::wait_for_stop`]; returning
/// from `start` means the service is done. `stop` runs once per
/// deactivation request, on the control-dispatch thread, concurrently with
/// a blocked `start`; implementations keep any mutable state in
/// interior-mutable types (atomics, mutexes).
///
/// Trivial implementations are legal; see [`NoopService`].
pub trait ServiceLogic: Send + Sync {
    fn start(&self, ctx: &ServiceContext) -> Result<()>;
    fn stop(&self, ctx: &ServiceContext) -> Result<()>;
}

/// Per-instance state shared with the lifecycle hooks.
pub struct ServiceContext {
    config: ServiceConfig,
    launch_args: Vec<OsString>,
    stop: StopSignal,
    status: Arc<dyn StatusReporter>,
}

impl ServiceContext {
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Arguments the OS passed when launching the service process.
    pub fn launch_args(&self) -> &[OsString] {
        &self.launch_args
    }

    /// Operation timeout for any sockets the service opens.
    pub fn socket_timeout(&self) -> Duration {
        self.config.socket_timeout()
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Block until a stop has been requested.
    pub fn wait_for_stop(&self) {
        self.stop.wait();
    }

    /// Mirror a status transition to the OS.
    pub fn report(&self, state: ServiceState) -> Result<()> {
        self.status.report(state)
    }
}

/// Maps OS control requests onto a [`ServiceLogic`] implementation.
///
/// The host is shared between the main thread (running [`run_started`])
/// and the control-dispatch thread (delivering [`stop_requested`]), so
/// both entry points take `&self`.
///
/// Every entry point is traced and guarded: failures are logged and
/// swallowed, never surfaced to the control-dispatch layer.
///
/// [`run_started`]: ServiceHost::run_started
/// [`stop_requested`]: ServiceHost::stop_requested
pub struct ServiceHost {
    ctx: ServiceContext,
    logic: Box<dyn ServiceLogic>,
}

impl std::fmt::Debug for ServiceHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHost")
            .field("name", &self.ctx.config.name)
            .finish()
    }
}

impl ServiceHost {
    pub fn new(
        config: ServiceConfig,
        launch_args: Vec<OsString>,
        logic: Box<dyn ServiceLogic>,
        status: Arc<dyn StatusReporter>,
    ) -> Self {
        traced("new", (config.name.clone(), launch_args.clone()), || Self {
            ctx: ServiceContext {
                config,
                launch_args,
                stop: StopSignal::new(),
                status,
            },
            logic,
        })
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Called when the OS asks the service to start: runs the `start` hook.
    pub fn run_started(&self) {
        traced("run_started", &self.ctx.config.name, || {
            guarded("start", || {
                traced("start", (), || self.logic.start(&self.ctx))
            })
        });
    }

    /// Called when the OS asks the service to stop: runs the `stop` hook to
    /// completion, reports `StopPending`, then sets the stop signal, in that
    /// order. Code blocked on the signal only wakes after cleanup has run.
    pub fn stop_requested(&self) {
        traced("stop_requested", &self.ctx.config.name, || {
            guarded("stop_requested", || {
                traced("stop", (), || self.logic.stop(&self.ctx))?;
                self.ctx.report(ServiceState::StopPending)?;
                self.ctx.stop.set();
                Ok(())
            })
        });
    }
}

/// Template service: `start` returns immediately and `stop` reports the
/// final `Stopped` state. A deployment replaces this with its own logic
/// and sets real identity strings in the config.
pub struct NoopService;

impl ServiceLogic for NoopService {
    fn start(&self, _ctx: &ServiceContext) -> Result<()> {
        Ok(())
    }

    fn stop(&self, ctx: &ServiceContext) -> Result<()> {
        ctx.report(ServiceState::Stopped)
    }
}
