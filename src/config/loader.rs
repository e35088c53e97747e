//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::Config;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RunMode;

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("procmain-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[run]\nmode = \"interactive\"\n").unwrap();

        let config = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.run.mode, RunMode::Interactive);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("procmain-does-not-exist.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config("[logging]\nlevel = \"\"\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: logging.level must not be empty"
        );
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            parse_config("[run\nmode = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
