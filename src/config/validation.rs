//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate that listen specs are present and non-blank
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: MgmtConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::MgmtConfig;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoListenSpecs,
    BlankListenSpec { index: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoListenSpecs => {
                write!(f, "listen.specs must name at least one endpoint")
            }
            ValidationError::BlankListenSpec { index } => {
                write!(f, "listen.specs[{}] is blank", index)
            }
        }
    }
}

/// Check a parsed configuration for semantic problems.
pub fn validate_config(config: &MgmtConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen.specs.is_empty() {
        errors.push(ValidationError::NoListenSpecs);
    }
    for (index, spec) in config.listen.specs.iter().enumerate() {
        // The empty string is a valid wildcard endpoint; whitespace is not.
        if spec.trim().is_empty() && !spec.is_empty() {
            errors.push(ValidationError::BlankListenSpec { index });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
