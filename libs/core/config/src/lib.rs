pub mod smtp;
pub mod tracing;

use std::env;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Environment variables are required but not set: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment (development = local SMTP catchers, production = real relays)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load an environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Helper to load an environment variable, treating an empty value as unset
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Load several required variables at once.
///
/// Every missing key is reported in a single [`ConfigError::MissingEnvVars`],
/// in the order the keys were given.
pub fn env_required_all<const N: usize>(keys: [&str; N]) -> Result<[String; N], ConfigError> {
    let mut missing = Vec::new();
    let values = keys.map(|key| match env::var(key) {
        Ok(value) => value,
        Err(_) => {
            missing.push(key.to_string());
            String::new()
        }
    });

    if missing.is_empty() {
        Ok(values)
    } else {
        Err(ConfigError::MissingEnvVars(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("Production"), || {
            assert!(Environment::from_env().is_production());
        });
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default_without_value() {
        temp_env::with_var_unset("MAIL_TEST_MISSING", || {
            assert_eq!(env_or_default("MAIL_TEST_MISSING", "fallback"), "fallback");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("MAIL_TEST_REQUIRED", || {
            let err = env_required("MAIL_TEST_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("MAIL_TEST_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_optional_treats_empty_as_unset() {
        temp_env::with_var("MAIL_TEST_OPTIONAL", Some(""), || {
            assert_eq!(env_optional("MAIL_TEST_OPTIONAL"), None);
        });
        temp_env::with_var("MAIL_TEST_OPTIONAL", Some("value"), || {
            assert_eq!(env_optional("MAIL_TEST_OPTIONAL").as_deref(), Some("value"));
        });
    }

    #[test]
    fn test_env_required_all_reports_every_missing_key() {
        temp_env::with_vars(
            [
                ("MAIL_TEST_A", Some("a")),
                ("MAIL_TEST_B", None),
                ("MAIL_TEST_C", None),
            ],
            || {
                let err = env_required_all(["MAIL_TEST_A", "MAIL_TEST_B", "MAIL_TEST_C"])
                    .unwrap_err();
                assert_eq!(
                    err,
                    ConfigError::MissingEnvVars(vec![
                        "MAIL_TEST_B".to_string(),
                        "MAIL_TEST_C".to_string()
                    ])
                );
                assert!(err.to_string().contains("MAIL_TEST_B, MAIL_TEST_C"));
            },
        );
    }

    #[test]
    fn test_env_required_all_success() {
        temp_env::with_vars([("MAIL_TEST_X", Some("x")), ("MAIL_TEST_Y", Some("y"))], || {
            let [x, y] = env_required_all(["MAIL_TEST_X", "MAIL_TEST_Y"]).unwrap();
            assert_eq!(x, "x");
            assert_eq!(y, "y");
        });
    }
}
