//! Process supervision subsystem.
//!
//! # Data Flow
//! ```text
//! Daemonization (daemon.rs):
//!     pipe → fork → parent blocks on handshake, child detaches
//!     child finishes init → signal_ready(status) → parent exits with it
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → clean shutdown
//!     SIGHUP → rebind the listen sockets (shed stale listen state)
//! ```
//!
//! # Design Decisions
//! - The handshake is the only genuine inter-process concurrency in the
//!   core: one u32, one direction, one shot
//! - The invoking process never exits before the daemon's startup
//!   outcome is known
//! - Fork happens before the async runtime exists

pub mod daemon;
pub mod signals;

pub use daemon::{daemonize, DaemonState, ReadySignal, Supervision};
