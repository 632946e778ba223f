//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{InterflowConfig, LogOutput, LoggingConfig, SessionConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &InterflowConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_session_config(&config.session)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.filters.keys().any(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation("Log filter targets cannot be empty"));
    }

    Ok(())
}

/// Validates session store settings.
fn validate_session_config(session: &SessionConfig) -> ConfigResult<()> {
    if session.max_entries == 0 {
        return Err(ConfigError::validation(
            "session.max_entries must be greater than 0",
        ));
    }

    if session.max_age_secs == 0 {
        return Err(ConfigError::validation(
            "session.max_age_secs must be greater than 0",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&InterflowConfig::default()).is_ok());
    }

    #[test]
    fn test_session_limits() {
        let mut config = InterflowConfig::default();
        config.session.max_age_secs = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.session.max_age_secs = 60;
        config.session.max_entries = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = InterflowConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "logging.file_path"
        ));

        config.logging.file_path = Some("logs/interflow.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_filter_target() {
        let mut config = InterflowConfig::default();
        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
