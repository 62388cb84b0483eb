use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.cache.registrations_window_secs == 0 {
        return Err(ConfigError::Validation {
            message: "cache.registrations_window_secs must be greater than zero".to_string(),
        });
    }
    if config.cache.clients_window_secs == 0 {
        return Err(ConfigError::Validation {
            message: "cache.clients_window_secs must be greater than zero".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.cache.registrations_window_secs, 120);
        assert_eq!(config.cache.clients_window_secs, 86_400);
    }

    #[test]
    fn test_explicit_windows() {
        let config = load_config_from_str(
            r#"{ "cache": { "registrations_window_secs": 30, "clients_window_secs": 3600 } }"#,
        )
        .unwrap();
        assert_eq!(config.cache.registrations_window_secs, 30);
        assert_eq!(config.cache.clients_window_secs, 3600);
    }

    #[test]
    fn test_zero_window_fails_validation() {
        let result = load_config_from_str(
            r#"{ "cache": { "registrations_window_secs": 0 } }"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_invalid_json_fails() {
        assert!(matches!(
            load_config_from_str("not json"),
            Err(ConfigError::ParseJson(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "cache": { "registrations_window_secs": 45 } }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.cache.registrations_window_secs, 45);
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(matches!(
            load_config("/nonexistent/config.json"),
            Err(ConfigError::ReadFile { .. })
        ));
    }
}
