//! Svcframe - Scaffolding for Windows background services
//!
//! The service-control manager launches the binary, control requests are
//! mapped onto a pair of lifecycle hooks ([`ServiceLogic`]), and status
//! transitions are mirrored back to the OS. The same binary doubles as its
//! own control tool (install/remove/start/stop/restart/update) and can run
//! in the foreground for debugging.

pub mod config;
pub mod control;
pub mod logging;
pub mod service;
pub mod signal;
pub mod status;
pub mod trace;

pub use config::ServiceConfig;
pub use control::{ControlError, ControlVerb};
pub use service::{NoopService, ServiceContext, ServiceHost, ServiceLogic};
pub use signal::StopSignal;
pub use status::{LogStatusReporter, ServiceState, StatusReporter};
