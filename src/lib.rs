//! Management-process core for the gateway cache daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   -a arguments / config file
//!        │
//!        ▼
//!   ┌──────────┐   resolve    ┌──────────┐   bind    ┌─────────────┐
//!   │ acceptor │─────────────▶│ resolver │──────────▶│   binder    │
//!   │ manager  │              └──────────┘           │ (privilege  │
//!   └────┬─────┘                                     │  bracket)   │
//!        │ insert                                    └──────┬──────┘
//!        ▼                                                  │ mark fd
//!   ┌──────────┐                                     ┌──────▼──────┐
//!   │  listen  │  ordered, duplicate-free            │  inherited  │
//!   │  table   │─────────────────────────────────▶   │ descriptors │
//!   └──────────┘  handed to the worker process       └─────────────┘
//!
//!   Independently, at process start:
//!   ┌──────────┐  fork   ┌───────────────┐  one u32 over a pipe
//!   │ invoking │────────▶│ detached child│─────────────────────▶ exit code
//!   │ process  │  waits  │ (the manager) │  signal_ready(status)
//!   └──────────┘         └───────────────┘
//! ```

pub mod config;
pub mod jail;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod transport;

pub use config::schema::MgmtConfig;
pub use lifecycle::daemon::Supervision;
pub use net::acceptor::AcceptorManager;
