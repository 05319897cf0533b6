//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MgmtConfig (validated, immutable)
//!
//! CLI flags override the file: -a replaces the listen specs,
//! -F forces foreground mode.
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path, the
//!   manager restarts instead
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::load_config;
pub use schema::{DaemonConfig, ListenConfig, MgmtConfig};
