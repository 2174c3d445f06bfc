//! Service states and the seam through which they are mirrored to the OS.

use anyhow::Result;
use log::info;

/// The states the service-control manager tracks for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    StartPending,
    Running,
    StopPending,
    Stopped,
}

/// Sink for status transitions.
///
/// Service code reports through this trait so the same lifecycle wiring
/// works against the SCM, the console, and tests.
pub trait StatusReporter: Send + Sync {
    fn report(&self, state: ServiceState) -> Result<()>;
}

/// Reporter for console mode and non-Windows builds: transitions only go
/// to the log.
pub struct LogStatusReporter;

impl StatusReporter for LogStatusReporter {
    fn report(&self, state: ServiceState) -> Result<()> {
        info!("Service status: {:?}", state);
        Ok(())
    }
}

#[cfg(windows)]
pub use self::scm::ScmStatusReporter;

#[cfg(windows)]
mod scm {
    use super::{ServiceState, StatusReporter};
    use anyhow::Result;
    use log::debug;
    use std::sync::OnceLock;
    use std::time::Duration;
    use windows_service::service::{
        ServiceControlAccept, ServiceExitCode, ServiceState as ScmState, ServiceStatus,
        ServiceType,
    };
    use windows_service::service_control_handler::ServiceStatusHandle;

    /// Reporter backed by the handle returned from control-handler
    /// registration.
    ///
    /// The handle only exists after registration, and registration needs
    /// the stop path already wired, so the handle is attached after
    /// construction. Reports before attachment are dropped with a debug
    /// line.
    pub struct ScmStatusReporter {
        handle: OnceLock<ServiceStatusHandle>,
    }

    impl ScmStatusReporter {
        pub fn new() -> Self {
            Self {
                handle: OnceLock::new(),
            }
        }

        pub fn attach(&self, handle: ServiceStatusHandle) {
            let _ = self.handle.set(handle);
        }
    }

    impl StatusReporter for ScmStatusReporter {
        fn report(&self, state: ServiceState) -> Result<()> {
            let Some(handle) = self.handle.get() else {
                debug!("Status {:?} reported before SCM registration, dropping", state);
                return Ok(());
            };
            let current_state = match state {
                ServiceState::StartPending => ScmState::StartPending,
                ServiceState::Running => ScmState::Running,
                ServiceState::StopPending => ScmState::StopPending,
                ServiceState::Stopped => ScmState::Stopped,
            };
            let controls_accepted = if state == ServiceState::Running {
                ServiceControlAccept::STOP | ServiceControlAccept::SHUTDOWN
            } else {
                ServiceControlAccept::empty()
            };
            handle.set_service_status(ServiceStatus {
                service_type: ServiceType::OWN_PROCESS,
                current_state,
                controls_accepted,
                exit_code: ServiceExitCode::Win32(0),
                checkpoint: 0,
                wait_hint: Duration::default(),
                process_id: None,
            })?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_reporter_accepts_every_state() {
        let (_guard, _capture) = crate::trace::testlog::exclusive();
        let reporter = LogStatusReporter;
        for state in [
            ServiceState::StartPending,
            ServiceState::Running,
            ServiceState::StopPending,
            ServiceState::Stopped,
        ] {
            assert!(reporter.report(state).is_ok());
        }
    }
}
