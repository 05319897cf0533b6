//! Socket binding and rebinding.
//!
//! # Responsibilities
//! - Open one listen socket per table entry, bracketed by the privilege
//!   jail (low ports may need momentarily elevated rights)
//! - Classify bind failures: fatal OS errors vs. the silent
//!   address-family skip on hosts lacking a family
//! - Adopt the OS-assigned port when the requested port was the wildcard
//!   value 0, exactly once, at first successful bind
//! - Keep the inheritance bookkeeping in step with every descriptor
//!   opened or released
//!
//! Reopen exists to shed listening state inherited across an exec
//! boundary: every entry is released and rebound in place, and partial
//! failure never aborts the sockets that did succeed.

use std::io;
use std::net::SocketAddr;
use std::os::fd::AsRawFd;

use nix::errno::Errno;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::jail::{Jail, PrivilegeBracket};
use crate::net::inherit::InheritedFds;
use crate::net::table::{ListenSocket, ListenTable};

/// How a bind attempt ended, for callers that branch on meaning.
///
/// Fatal OS failures travel separately as `Err`; the caller decides
/// fatality (initial acquisition aborts, reopen aggregates).
#[derive(Debug, PartialEq, Eq)]
pub enum BindOutcome {
    /// The handle is bound; address and display string are canonical.
    Bound,
    /// The host does not support this address family; drop the candidate.
    Unsupported,
}

/// Open (or reopen) the socket for one table entry.
///
/// An already-bound handle is released first, keeping its identity and
/// canonical address. The privileged bracket is held only around the
/// bind attempt and released on every exit path.
pub fn open_socket(
    ls: &mut ListenSocket,
    jail: &dyn Jail,
    fds: &mut InheritedFds,
) -> io::Result<BindOutcome> {
    if let Some(old) = ls.sock.take() {
        fds.unmark(old.as_raw_fd());
    }

    let attempt = {
        let _bracket = PrivilegeBracket::enter(jail)?;
        bind_socket(&ls.addr)
    };

    let sock = match attempt {
        Ok(sock) => sock,
        Err(e) if e.raw_os_error() == Some(Errno::EAFNOSUPPORT as i32) => {
            return Ok(BindOutcome::Unsupported);
        }
        Err(e) => return Err(e),
    };

    if ls.addr.port() == 0 {
        // Adopt whatever port the bind found us, as if the operator had
        // asked for it. Later reopens go through the concrete address.
        let local = sock.local_addr()?.as_socket().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "bound address is not inet")
        })?;
        ls.addr = local;
        ls.endpoint = local.to_string();
    }

    fds.mark(sock.as_raw_fd(), Some("sock"));
    ls.sock = Some(sock);
    Ok(BindOutcome::Bound)
}

/// Rebind every table entry, continuing past individual failures.
///
/// Returns the numerically highest OS error code observed, 0 when every
/// entry rebound. Each failing entry gets its own diagnostic.
pub fn reopen_all(table: &mut ListenTable, jail: &dyn Jail, fds: &mut InheritedFds) -> i32 {
    let mut worst = 0;
    for ls in table.iter_mut() {
        let err = match open_socket(ls, jail, fds) {
            Ok(BindOutcome::Bound) => continue,
            Ok(BindOutcome::Unsupported) => {
                io::Error::from_raw_os_error(Errno::EAFNOSUPPORT as i32)
            }
            Err(e) => e,
        };
        let code = err.raw_os_error().unwrap_or(Errno::EIO as i32);
        if code > worst {
            worst = code;
        }
        tracing::error!(
            endpoint = %ls.endpoint(),
            error = %err,
            "Could not reopen listen socket"
        );
    }
    worst
}

/// Create and bind the OS socket for one address.
///
/// The management process binds but does not listen; listening state
/// belongs to the worker.
fn bind_socket(addr: &SocketAddr) -> io::Result<Socket> {
    let sock = Socket::new(Domain::for_address(*addr), Type::STREAM, Some(Protocol::TCP))?;
    sock.set_reuse_address(true)?;
    if addr.is_ipv6() {
        // Dual-stack hosts bind the v4 and v6 wildcards separately.
        sock.set_only_v6(true)?;
    }
    sock.bind(&SockAddr::from(*addr))?;
    Ok(sock)
}
