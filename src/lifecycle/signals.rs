//! OS signal handling for the running manager.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - SIGTERM/SIGINT stop the manager
//! - SIGHUP rebinds the listen sockets to shed stale listening state

use std::io;

use tokio::signal::unix::{signal, SignalKind};

use crate::jail::Jail;
use crate::net::acceptor::AcceptorManager;
use crate::net::inherit::InheritedFds;

/// Run until a termination signal arrives.
///
/// Reopen failures are not fatal here; the aggregate error code is
/// logged and the sockets that did rebind stay usable.
pub async fn run(
    mgr: &mut AcceptorManager,
    jail: &dyn Jail,
    fds: &mut InheritedFds,
) -> io::Result<()> {
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let mut hup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            _ = term.recv() => {
                tracing::info!("SIGTERM received, stopping");
                break;
            }
            _ = int.recv() => {
                tracing::info!("SIGINT received, stopping");
                break;
            }
            _ = hup.recv() => {
                tracing::info!("SIGHUP received, reopening listen sockets");
                let worst = mgr.reopen_all(jail, fds);
                if worst == 0 {
                    tracing::info!(sockets = mgr.table().len(), "Listen sockets reopened");
                } else {
                    tracing::warn!(errno = worst, "Listen socket reopen finished with errors");
                }
            }
        }
    }
    Ok(())
}
