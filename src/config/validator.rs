use crate::config::Config;
use crate::error::{HubwatchError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_device(config, &mut errors);
        Self::validate_storage(config, &mut errors);
        Self::validate_analysis(config, &mut errors);
        Self::validate_patterns(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(HubwatchError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_device(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.device.address.is_empty() {
            errors.push(ValidationError::new(
                "device.address",
                "Device address cannot be empty",
            ));
        }

        if config.device.poll_interval_secs == 0 {
            errors.push(ValidationError::new(
                "device.poll_interval_secs",
                "Poll interval must be at least 1 second",
            ));
        }

        if config.device.request_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "device.request_timeout_secs",
                "Request timeout must be at least 1 second",
            ));
        }
    }

    fn validate_storage(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.storage.log_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.log_file",
                "Log file path cannot be empty",
            ));
        }
    }

    fn validate_analysis(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.analysis.outage_gap_secs == 0 {
            errors.push(ValidationError::new(
                "analysis.outage_gap_secs",
                "Outage gap must be at least 1 second",
            ));
        }

        let percent = config.analysis.critical_percent_threshold;
        if !(0.0..=100.0).contains(&percent) {
            errors.push(ValidationError::new(
                "analysis.critical_percent_threshold",
                format!("Threshold must be between 0 and 100, got {}", percent),
            ));
        }
    }

    fn validate_patterns(config: &Config, errors: &mut Vec<ValidationError>) {
        // Regex compilation is checked when the table is built; here we only
        // catch structurally empty tables that would classify nothing.
        if config.patterns.severities.is_empty() {
            errors.push(ValidationError::new(
                "patterns.severities",
                "Severity table cannot be empty",
            ));
        }

        for (i, pattern) in config.patterns.messages.iter().enumerate() {
            if pattern.pattern.is_empty() {
                errors.push(ValidationError::new(
                    format!("patterns.messages[{}]", i),
                    format!("Pattern '{}' is empty", pattern.name),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let mut config = Config::default();
        config.device.poll_interval_secs = 0;

        let err = ConfigValidator::validate(&config).unwrap_err();
        match err {
            HubwatchError::ConfigValidation { errors } => {
                assert!(errors
                    .iter()
                    .any(|e| e.path == "device.poll_interval_secs"));
            }
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_percent_threshold_is_rejected() {
        let mut config = Config::default();
        config.analysis.critical_percent_threshold = 150.0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_empty_severity_table_is_rejected() {
        let mut config = Config::default();
        config.patterns.severities.clear();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_multiple_errors_are_collected() {
        let mut config = Config::default();
        config.device.address.clear();
        config.device.poll_interval_secs = 0;

        match ConfigValidator::validate(&config).unwrap_err() {
            HubwatchError::ConfigValidation { errors } => assert_eq!(errors.len(), 2),
            other => panic!("Unexpected error: {other}"),
        }
    }
}
