//! gatewayd — management process for the gateway cache daemon.
//!
//! Startup ordering matters here:
//!
//! 1. Parse arguments and the config file. Errors at this stage are
//!    reported on the invoking terminal and exit before any fork.
//! 2. Daemonize (unless `-F`). The invoking process now blocks on the
//!    readiness handshake; everything below runs detached, with stderr
//!    still attached so acquisition diagnostics reach the operator.
//! 3. Acquire the listen sockets. A failure is reported through the
//!    handshake so the invoker's exit code reflects it.
//! 4. Signal readiness, then serve signals: SIGHUP rebinds the listen
//!    sockets, SIGTERM/SIGINT stop the manager.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use gatewayd::config::{load_config, MgmtConfig};
use gatewayd::jail::{Jail, NullJail};
use gatewayd::lifecycle::{self, Supervision};
use gatewayd::net::{AcceptorManager, InheritedFds, SpecError};
use gatewayd::observability;

/// Exit status for configuration and acquisition errors.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "gatewayd")]
#[command(about = "Management process for the gateway cache daemon", version)]
struct Args {
    /// Listen address spec, `[name=]endpoint[,transport]`. Repeatable.
    #[arg(short = 'a', long = "listen-address", value_name = "SPEC")]
    listen_address: Vec<String>,

    /// Run in the foreground instead of daemonizing.
    #[arg(short = 'F', long)]
    foreground: bool,

    /// Path to a TOML configuration file.
    #[arg(short = 'f', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match args.config.as_deref() {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("gatewayd: {e}");
                return ExitCode::from(EXIT_CONFIG);
            }
        },
        None => MgmtConfig::default(),
    };
    if !args.listen_address.is_empty() {
        config.listen.specs = args.listen_address;
    }
    let foreground = args.foreground || config.daemon.foreground;

    // Fork before the runtime or any threads exist. The parent never
    // returns from this call.
    let supervision = match lifecycle::daemonize(foreground) {
        Ok(supervision) => supervision,
        Err(e) => {
            eprintln!("gatewayd: fork failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    observability::logging::init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        foreground,
        "gatewayd manager starting"
    );

    let jail = NullJail;
    let mut fds = InheritedFds::new();

    let mut mgr = match acquire_listeners(&config, &jail, &mut fds) {
        Ok(mgr) => mgr,
        Err(e) => {
            tracing::error!(error = %e, "Listener acquisition failed");
            return fail_startup(supervision, EXIT_CONFIG);
        }
    };

    for entry in mgr.table().iter() {
        tracing::info!(
            name = %entry.name(),
            transport = %entry.transport().name,
            endpoint = %entry.endpoint(),
            fd = ?entry.fd(),
            "Listen socket bound"
        );
    }
    if let Ok(snapshot) = serde_json::to_string(&mgr.table().snapshot()) {
        tracing::debug!(listeners = %snapshot, "Listen table populated");
    }

    if let Supervision::Detached(ready) = supervision {
        if let Err(e) = ready.signal_ready(0) {
            tracing::error!(error = %e, "Could not signal readiness");
            return ExitCode::FAILURE;
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Could not start runtime");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = runtime.block_on(lifecycle::signals::run(&mut mgr, &jail, &mut fds)) {
        tracing::error!(error = %e, "Signal handling failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("manager stopping");
    ExitCode::SUCCESS
}

/// Bind every configured listen spec; any failure aborts startup.
fn acquire_listeners(
    config: &MgmtConfig,
    jail: &dyn Jail,
    fds: &mut InheritedFds,
) -> Result<AcceptorManager, SpecError> {
    let mut mgr = AcceptorManager::new(config.listen.default_port);
    for spec in &config.listen.specs {
        mgr.add_spec(spec, jail, fds)?;
    }
    Ok(mgr)
}

/// Report a startup failure through the handshake, if one is pending.
fn fail_startup(supervision: Supervision, status: u8) -> ExitCode {
    if let Supervision::Detached(ready) = supervision {
        let _ = ready.signal_ready(u32::from(status));
    }
    ExitCode::from(status)
}
