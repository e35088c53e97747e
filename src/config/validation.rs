//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the log filter directive is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::Config;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("logging.level must not be empty")]
    EmptyLogLevel,

    #[error("logging.level '{directive}' is not a valid filter: {reason}")]
    InvalidLogLevel { directive: String, reason: String },
}

/// Check `config` for problems serde cannot catch.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim();
    if level.is_empty() {
        errors.push(ValidationError::EmptyLogLevel);
    } else if let Err(e) = EnvFilter::try_new(level) {
        errors.push(ValidationError::InvalidLogLevel {
            directive: level.to_string(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_directive_with_targets_is_valid() {
        let mut config = Config::default();
        config.logging.level = "warn,procmain=debug".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "  ".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::EmptyLogLevel])
        );
    }

    #[test]
    fn test_bad_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "procmain=loud".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::InvalidLogLevel { .. }));
    }
}
