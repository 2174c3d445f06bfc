//! Command-line service control: install, remove, start, stop, restart,
//! update. The actual work is done by the OS service utility layer; this
//! module only names the target service and the requested action.

use crate::config::ServiceConfig;
use thiserror::Error;

/// Control verbs recognized on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlVerb {
    Install,
    Remove,
    Start,
    Stop,
    Restart,
    Debug,
    Update,
}

impl ControlVerb {
    pub const ALL: [ControlVerb; 7] = [
        ControlVerb::Install,
        ControlVerb::Remove,
        ControlVerb::Start,
        ControlVerb::Stop,
        ControlVerb::Restart,
        ControlVerb::Debug,
        ControlVerb::Update,
    ];

    pub fn parse(arg: &str) -> Option<Self> {
        match arg.to_ascii_lowercase().as_str() {
            "install" => Some(ControlVerb::Install),
            "remove" => Some(ControlVerb::Remove),
            "start" => Some(ControlVerb::Start),
            "stop" => Some(ControlVerb::Stop),
            "restart" => Some(ControlVerb::Restart),
            "debug" => Some(ControlVerb::Debug),
            "update" => Some(ControlVerb::Update),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlVerb::Install => "install",
            ControlVerb::Remove => "remove",
            ControlVerb::Start => "start",
            ControlVerb::Stop => "stop",
            ControlVerb::Restart => "restart",
            ControlVerb::Debug => "debug",
            ControlVerb::Update => "update",
        }
    }
}

/// Control operation error
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Unknown verb: {0}")]
    UnknownVerb(String),

    #[error("Service name is empty; set one in the configuration before installing")]
    MissingName,

    #[error("Unsupported operation on this platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Service did not stop within {0} seconds")]
    StopTimeout(u64),

    #[cfg(windows)]
    #[error("Service manager operation failed: {0}")]
    Scm(#[from] windows_service::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for control operations
pub type ControlResult<T> = std::result::Result<T, ControlError>;

/// Run `verb` against the OS service manager for the configured service.
///
/// `ControlVerb::Debug` never reaches this function; the entry point runs
/// the service in the foreground instead.
pub fn dispatch(verb: ControlVerb, config: &ServiceConfig) -> ControlResult<()> {
    if config.name.is_empty() {
        return Err(ControlError::MissingName);
    }
    platform::dispatch(verb, config)
}

/// Usage text listing the recognized verbs.
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {} [{}]\n\
         Run with no arguments to be managed by the service-control manager.",
        program,
        ControlVerb::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("|")
    )
}

#[cfg(windows)]
mod platform {
    use super::{ControlError, ControlResult, ControlVerb};
    use crate::config::ServiceConfig;
    use log::info;
    use std::ffi::{OsStr, OsString};
    use std::thread;
    use std::time::Duration;
    use windows_service::service::{
        Service, ServiceAccess, ServiceErrorControl, ServiceInfo, ServiceStartType,
        ServiceState, ServiceType,
    };
    use windows_service::service_manager::{ServiceManager, ServiceManagerAccess};

    const STOP_WAIT_SECS: u64 = 10;

    pub fn dispatch(verb: ControlVerb, config: &ServiceConfig) -> ControlResult<()> {
        match verb {
            ControlVerb::Install => install(config),
            ControlVerb::Remove => remove(config),
            ControlVerb::Start => start(config),
            ControlVerb::Stop => stop(config).map(|_| ()),
            ControlVerb::Restart => restart(config),
            ControlVerb::Update => update(config),
            ControlVerb::Debug => unreachable!("debug runs in the foreground"),
        }
    }

    fn service_info(config: &ServiceConfig) -> ControlResult<ServiceInfo> {
        Ok(ServiceInfo {
            name: OsString::from(&config.name),
            display_name: OsString::from(&config.display_name),
            service_type: ServiceType::OWN_PROCESS,
            start_type: ServiceStartType::OnDemand,
            error_control: ServiceErrorControl::Normal,
            executable_path: std::env::current_exe()?,
            launch_arguments: vec![],
            dependencies: vec![],
            account_name: None,
            account_password: None,
        })
    }

    fn open_manager(access: ServiceManagerAccess) -> ControlResult<ServiceManager> {
        Ok(ServiceManager::local_computer(None::<&str>, access)?)
    }

    fn open_service(config: &ServiceConfig, access: ServiceAccess) -> ControlResult<Service> {
        let manager = open_manager(ServiceManagerAccess::CONNECT)?;
        Ok(manager.open_service(&config.name, access)?)
    }

    fn install(config: &ServiceConfig) -> ControlResult<()> {
        let manager =
            open_manager(ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE)?;
        let service = manager.create_service(&service_info(config)?, ServiceAccess::CHANGE_CONFIG)?;
        service.set_description(&config.description)?;
        info!("Service {} installed", config.name);
        Ok(())
    }

    fn remove(config: &ServiceConfig) -> ControlResult<()> {
        let service = open_service(config, ServiceAccess::DELETE)?;
        service.delete()?;
        info!("Service {} removed", config.name);
        Ok(())
    }

    fn start(config: &ServiceConfig) -> ControlResult<()> {
        let service = open_service(config, ServiceAccess::START)?;
        service.start(&[] as &[&OsStr])?;
        info!("Service {} started", config.name);
        Ok(())
    }

    fn stop(config: &ServiceConfig) -> ControlResult<Service> {
        let service = open_service(config, ServiceAccess::STOP | ServiceAccess::QUERY_STATUS)?;
        service.stop()?;
        info!("Service {} stop requested", config.name);
        Ok(service)
    }

    fn restart(config: &ServiceConfig) -> ControlResult<()> {
        let service = stop(config)?;
        let deadline = STOP_WAIT_SECS * 10;
        for _ in 0..deadline {
            if service.query_status()?.current_state == ServiceState::Stopped {
                drop(service);
                return start(config);
            }
            thread::sleep(Duration::from_millis(100));
        }
        Err(ControlError::StopTimeout(STOP_WAIT_SECS))
    }

    fn update(config: &ServiceConfig) -> ControlResult<()> {
        let service = open_service(config, ServiceAccess::CHANGE_CONFIG)?;
        service.change_config(&service_info(config)?)?;
        service.set_description(&config.description)?;
        info!("Service {} updated", config.name);
        Ok(())
    }
}

#[cfg(not(windows))]
mod platform {
    use super::{ControlError, ControlResult, ControlVerb};
    use crate::config::ServiceConfig;

    pub fn dispatch(verb: ControlVerb, _config: &ServiceConfig) -> ControlResult<()> {
        Err(ControlError::UnsupportedPlatform(format!(
            "{} requires the Windows service-control manager",
            verb.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_advertised_verb_parses() {
        for verb in ControlVerb::ALL {
            assert_eq!(ControlVerb::parse(verb.as_str()), Some(verb));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ControlVerb::parse("Install"), Some(ControlVerb::Install));
        assert_eq!(ControlVerb::parse("STOP"), Some(ControlVerb::Stop));
    }

    #[test]
    fn test_unknown_verb_does_not_parse() {
        assert_eq!(ControlVerb::parse("frobnicate"), None);
        assert_eq!(ControlVerb::parse(""), None);
    }

    #[test]
    fn test_usage_lists_every_verb() {
        let text = usage("svcframe");
        for verb in ControlVerb::ALL {
            assert!(text.contains(verb.as_str()));
        }
    }

    #[test]
    fn test_dispatch_rejects_empty_name_before_touching_the_os() {
        let config = ServiceConfig::default();
        let result = dispatch(ControlVerb::Install, &config);
        assert!(matches!(result, Err(ControlError::MissingName)));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_dispatch_is_unsupported_off_windows() {
        let config = ServiceConfig {
            name: "TestSvc".to_string(),
            ..ServiceConfig::default()
        };
        let result = dispatch(ControlVerb::Start, &config);
        assert!(matches!(result, Err(ControlError::UnsupportedPlatform(_))));
    }
}
