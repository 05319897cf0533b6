//! Listener acquisition subsystem.
//!
//! # Data Flow
//! ```text
//! Listen spec "[name=]endpoint[,transport]"
//!     → acceptor.rs (parse, label, transport lookup)
//!     → resolver.rs (endpoint → candidate addresses)
//!     → binder.rs (bind each candidate inside the privilege bracket)
//!     → table.rs (ordered, duplicate-free socket table)
//!     → inherit.rs (descriptors the worker keeps open)
//!
//! Socket states:
//!     Unbound → Bound → (reopen) Unbound → Bound
//! ```
//!
//! # Design Decisions
//! - Spec processing is strictly sequential; collision checks rely on
//!   seeing every previously inserted entry
//! - The table is single-writer during init, read-only afterwards
//! - Binding happens in the management process; listening belongs to the
//!   worker, which is why reopen can shed inherited listen state

pub mod acceptor;
pub mod binder;
pub mod inherit;
pub mod resolver;
pub mod table;

pub use acceptor::{AcceptorManager, ListenSpec, SpecError};
pub use binder::BindOutcome;
pub use inherit::InheritedFds;
pub use table::{ListenSocket, ListenTable, ListenerStatus};
