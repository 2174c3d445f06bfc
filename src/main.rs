use anyhow::Result;
use log::{error, info};
use std::env;
use std::sync::Arc;
use svcframe::{
    control, logging, LogStatusReporter, NoopService, ServiceConfig, ServiceHost,
};

#[cfg(windows)]
use std::ffi::OsString;
#[cfg(windows)]
use windows_service::{
    define_windows_service, service_dispatcher,
    service::{ServiceControl, ServiceControlHandlerResult},
    service_control_handler,
};
#[cfg(windows)]
use svcframe::{status::ScmStatusReporter, ServiceState};

#[cfg(windows)]
define_windows_service!(ffi_service_main, service_main);

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    logging::init();

    if args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        println!("{}", control::usage(&args[0]));
        return Ok(());
    }
    if args.contains(&"--version".to_string()) || args.contains(&"-v".to_string()) {
        println!("svcframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    match args.get(1).map(String::as_str) {
        None => run_as_service(&config),
        Some("--console") => run_console(&config),
        Some(arg) => match control::ControlVerb::parse(arg) {
            Some(control::ControlVerb::Debug) => run_console(&config),
            Some(verb) => {
                control::dispatch(verb, &config)?;
                Ok(())
            }
            None => {
                eprintln!("{}", control::usage(&args[0]));
                Err(control::ControlError::UnknownVerb(arg.to_string()).into())
            }
        },
    }
}

/// With no arguments the process is assumed to be launched by the
/// service-control manager; hand the main thread to its dispatcher.
#[cfg(windows)]
fn run_as_service(config: &ServiceConfig) -> Result<()> {
    info!("Attempting to run as Windows service...");
    match service_dispatcher::start(&config.name, ffi_service_main) {
        Ok(_) => Ok(()),
        Err(e) => {
            // Launched from a terminal rather than by the SCM.
            eprintln!("Failed to start as Windows service: {:?}", e);
            eprintln!("Running in console mode instead. Use --help for options.");
            run_console(config)
        }
    }
}

#[cfg(not(windows))]
fn run_as_service(config: &ServiceConfig) -> Result<()> {
    info!("No service-control manager on this platform, running in console mode");
    run_console(config)
}

/// Foreground mode: Ctrl-C and termination signals feed the stop path.
fn run_console(config: &ServiceConfig) -> Result<()> {
    info!("Starting in console mode...");

    let host = Arc::new(ServiceHost::new(
        config.clone(),
        Vec::new(),
        Box::new(NoopService),
        Arc::new(LogStatusReporter),
    ));

    let handler_host = host.clone();
    ctrlc::set_handler(move || handler_host.stop_requested())?;

    host.run_started();

    info!("Service exited");
    Ok(())
}

// Windows service entry, invoked by the SCM on its own thread.
#[cfg(windows)]
fn service_main(arguments: Vec<OsString>) {
    logging::init();

    info!("Windows service starting...");

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return;
        }
    };

    let reporter = Arc::new(ScmStatusReporter::new());
    let host = Arc::new(ServiceHost::new(
        config.clone(),
        arguments,
        Box::new(NoopService),
        reporter.clone(),
    ));

    let handler_host = host.clone();
    let event_handler = move |control_event| -> ServiceControlHandlerResult {
        match control_event {
            ServiceControl::Stop | ServiceControl::Shutdown => {
                info!("Received stop/shutdown signal");
                handler_host.stop_requested();
                ServiceControlHandlerResult::NoError
            }
            ServiceControl::Interrogate => ServiceControlHandlerResult::NoError,
            _ => ServiceControlHandlerResult::NotImplemented,
        }
    };

    let status_handle = match service_control_handler::register(&config.name, event_handler) {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to register service control handler: {:?}", e);
            return;
        }
    };
    reporter.attach(status_handle);

    if let Err(e) = host.context().report(ServiceState::Running) {
        error!("Failed to report running status: {:#}", e);
    }

    host.run_started();

    if let Err(e) = host.context().report(ServiceState::Stopped) {
        error!("Failed to report stopped status: {:#}", e);
    }

    info!("Service stopped");
}
