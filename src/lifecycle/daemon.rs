//! Daemonization with a readiness handshake.
//!
//! # State Machine
//! ```text
//!                    ┌──────────┐
//!                    │ ATTACHED │  foreground mode: no fork, the process
//!                    └────┬─────┘  owns its exit code directly
//!                   fork  │
//!            ┌────────────┴────────────┐
//!            ▼                         ▼
//!   ┌───────────────┐         ┌──────────────┐
//!   │ FORKED_PARENT │         │ FORKED_CHILD │  session leader, stdin on
//!   │ blocks on the │◀────────│ keeps write  │  /dev/null, stderr still
//!   │ read end      │  one    │ end for later│  attached for diagnostics
//!   └───────┬───────┘  u32    └──────────────┘
//!           ▼
//!   exit 0 / status / generic failure
//! ```
//!
//! The channel is single-use and one-directional. If the child dies
//! without signaling, the parent observes the closed channel and exits
//! with the generic failure status; it is never left blocked except in
//! the true-hang case.

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, OwnedFd};
use std::process;

use nix::libc;
use nix::unistd::{self, ForkResult};

/// Success sentinel written in place of status 0. A raw zero word on the
/// channel means the writer died mid-signal, not success.
const READY_MAGIC: u32 = 0x6774_7764;

/// Exit status reported when the channel closes without a valid word.
const GENERIC_FAILURE: i32 = 255;

/// Which side of the daemonization fork this process is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    /// No fork happened; the process runs in the foreground.
    Attached,
    /// The original invoking process, blocked on the handshake.
    ForkedParent,
    /// The detached process that continues as the real daemon.
    ForkedChild,
}

/// What `daemonize` handed back to the continuing process.
///
/// The parent side never gets one; it exits inside `daemonize` with a
/// status derived from the handshake.
#[derive(Debug)]
pub enum Supervision {
    /// Foreground mode; `signal_ready` is never invoked.
    Attached,
    /// Detached child; carries the write end of the handshake channel.
    Detached(ReadySignal),
}

impl Supervision {
    pub fn state(&self) -> DaemonState {
        match self {
            Supervision::Attached => DaemonState::Attached,
            Supervision::Detached(_) => DaemonState::ForkedChild,
        }
    }
}

/// Detach from the terminal, unless running in the foreground.
///
/// Must be called before any threads or the async runtime exist. On the
/// child side: new session, stdin on the null device, stdout/stderr left
/// attached so initialization diagnostics still reach the terminal. The
/// parent side does not return; it exits with the handshake outcome.
/// A fork failure is returned to the caller, which must treat it as
/// immediately fatal.
pub fn daemonize(foreground: bool) -> io::Result<Supervision> {
    if foreground {
        return Ok(Supervision::Attached);
    }

    let (rd, wr) = unistd::pipe().map_err(io::Error::from)?;

    match unsafe { unistd::fork() }.map_err(io::Error::from)? {
        ForkResult::Parent { .. } => {
            drop(wr);
            process::exit(read_status(rd));
        }
        ForkResult::Child => {
            drop(rd);
            unistd::setsid().map_err(io::Error::from)?;
            redirect_stdin_to_null()?;
            Ok(Supervision::Detached(ReadySignal { pipe: wr }))
        }
    }
}

/// Block until the detached side reports, and derive the exit status.
fn read_status(rd: OwnedFd) -> i32 {
    let mut channel = File::from(rd);
    let mut word = [0u8; 4];
    match channel.read_exact(&mut word) {
        Ok(()) => match u32::from_ne_bytes(word) {
            READY_MAGIC => 0,
            0 => GENERIC_FAILURE,
            status => status as i32,
        },
        // Wrong length or closed without data; both are the writer dying.
        Err(_) => GENERIC_FAILURE,
    }
}

/// Write end of the handshake channel, held by the detached child until
/// initialization succeeds or fails in a reportable way.
///
/// Consuming it is the only way to signal, so the status is written at
/// most once; dropping it unsignaled (including process death) closes
/// the channel and the parent reports the generic failure.
#[derive(Debug)]
pub struct ReadySignal {
    pipe: OwnedFd,
}

impl ReadySignal {
    /// Report the startup outcome and release the terminal.
    ///
    /// Status 0 is mapped to the success sentinel. All three standard
    /// streams are pointed at the null device first, so no terminal
    /// handle outlives the handshake.
    pub fn signal_ready(self, status: u32) -> io::Result<()> {
        redirect_stdio_to_null()?;
        self.send(status)
    }

    fn send(self, status: u32) -> io::Result<()> {
        let word = if status == 0 { READY_MAGIC } else { status };
        let mut channel = File::from(self.pipe);
        channel.write_all(&word.to_ne_bytes())
    }
}

fn redirect_stdin_to_null() -> io::Result<()> {
    let null = File::options().read(true).write(true).open("/dev/null")?;
    unistd::dup2(null.as_raw_fd(), libc::STDIN_FILENO).map_err(io::Error::from)?;
    Ok(())
}

fn redirect_stdio_to_null() -> io::Result<()> {
    let stdin = File::open("/dev/null")?;
    unistd::dup2(stdin.as_raw_fd(), libc::STDIN_FILENO).map_err(io::Error::from)?;

    let stdout = File::options().write(true).open("/dev/null")?;
    unistd::dup2(stdout.as_raw_fd(), libc::STDOUT_FILENO).map_err(io::Error::from)?;

    let stderr = File::options().write(true).open("/dev/null")?;
    unistd::dup2(stderr.as_raw_fd(), libc::STDERR_FILENO).map_err(io::Error::from)?;
    Ok(())
}
