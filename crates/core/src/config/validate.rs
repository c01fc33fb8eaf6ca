use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - defaults.image_quality lies in 1..=100
/// - engine.timeout_secs is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !(1..=100).contains(&config.defaults.image_quality) {
        return Err(ConfigError::ValidationError(format!(
            "defaults.image_quality must be between 1 and 100, got {}",
            config.defaults.image_quality
        )));
    }

    if config.engine.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "engine.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_quality_out_of_range_fails() {
        let mut config = Config::default();
        config.defaults.image_quality = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        config.defaults.image_quality = 101;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.engine.timeout_secs = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
