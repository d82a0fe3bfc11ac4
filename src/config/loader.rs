//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{AppConfig, OrchestrationMode};
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_API_KEY: &str = "EV_SENDGRID_API_KEY";
pub const ENV_CONTACT_LIST_ID: &str = "EV_CONTACT_LIST_ID";
pub const ENV_BIND_ADDRESS: &str = "EV_BIND_ADDRESS";
pub const ENV_MODE: &str = "EV_MODE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay secrets and deployment settings supplied through the environment.
///
/// Empty values are ignored so an unset-but-exported variable does not wipe
/// a value from the file.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(ENV_API_KEY) {
        config.sendgrid.api_key = key;
    }
    if let Some(list_id) = get(ENV_CONTACT_LIST_ID) {
        config.sendgrid.contact_list_id = list_id;
    }
    if let Some(addr) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(mode) = get(ENV_MODE) {
        config.orchestration.mode = mode
            .trim()
            .parse::<OrchestrationMode>()
            .map_err(|message| ConfigError::Env { var: ENV_MODE, message })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = AppConfig::default();
        config.sendgrid.contact_list_id = "from-file".into();

        apply_overrides(
            &mut config,
            lookup(&[(ENV_API_KEY, "env-key"), (ENV_CONTACT_LIST_ID, ""), (ENV_MODE, "validate_only")]),
        )
        .unwrap();

        assert_eq!(config.sendgrid.api_key, "env-key");
        assert_eq!(config.sendgrid.contact_list_id, "from-file");
        assert_eq!(config.orchestration.mode, OrchestrationMode::ValidateOnly);
    }

    #[test]
    fn test_bad_mode_is_rejected() {
        let mut config = AppConfig::default();
        let err = apply_overrides(&mut config, lookup(&[(ENV_MODE, "register_everything")])).unwrap_err();
        assert!(err.to_string().contains(ENV_MODE));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = ConfigError::Validation(vec![
            ValidationError { field: "a".into(), message: "x".into() },
            ValidationError { field: "b".into(), message: "y".into() },
        ]);
        assert_eq!(err.to_string(), "Validation failed: a: x, b: y");
    }
}
