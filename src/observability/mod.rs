//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → stderr while attached, the operator's log collector afterwards
//! ```
//!
//! # Design Decisions
//! - Structured logging only; the statistics segment lives outside this
//!   process
//! - Log level configurable via environment filter
//! - Diagnostics severity mapping: fatal startup errors log at error
//!   level before exit, reopen failures at error, skips at debug

pub mod logging;
