//! Privilege jail seam.
//!
//! Binding a listen port below 1024 may need momentarily elevated rights.
//! The elevation mechanism itself lives outside this crate; it is consumed
//! through [`Jail::enter`], called in strict bracket pairs. The
//! [`PrivilegeBracket`] guard guarantees the unprivileged mode is restored
//! on every exit path from a bind attempt, including early return on error.

use std::io;
use std::sync::{Mutex, MutexGuard};

/// Operating mode requested from the jail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JailMode {
    /// Momentarily elevated rights (e.g. binding a low-numbered port).
    Privileged,
    /// Normal operating rights.
    Unprivileged,
}

/// Interface to the privilege-elevation mechanism.
///
/// Mode transitions are expected in strict bracket pairs; a failure while
/// inside a bracket is not recoverable.
pub trait Jail {
    fn enter(&self, mode: JailMode) -> io::Result<()>;
}

/// Jail implementation for processes that do not manage privileges.
#[derive(Debug, Default)]
pub struct NullJail;

impl Jail for NullJail {
    fn enter(&self, _mode: JailMode) -> io::Result<()> {
        Ok(())
    }
}

/// Mode transitions are not reentrant; concurrent binders must serialize
/// through this lock.
static BRACKET_LOCK: Mutex<()> = Mutex::new(());

/// Scoped privileged-mode bracket.
///
/// Entering switches the jail to privileged mode; dropping the guard
/// restores unprivileged mode unconditionally.
pub struct PrivilegeBracket<'a> {
    jail: &'a dyn Jail,
    _serial: MutexGuard<'static, ()>,
}

impl<'a> PrivilegeBracket<'a> {
    pub fn enter(jail: &'a dyn Jail) -> io::Result<Self> {
        let serial = BRACKET_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        jail.enter(JailMode::Privileged)?;
        Ok(Self {
            jail,
            _serial: serial,
        })
    }
}

impl Drop for PrivilegeBracket<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.jail.enter(JailMode::Unprivileged) {
            tracing::error!(error = %e, "Could not leave privileged mode");
        }
    }
}
