//! Error types for the mail gateway.
//!
//! Only configuration and validation problems surface as `Err` to callers.
//! Transport problems are folded into a [`Response`](crate::Response) by
//! the gateway, so [`TransportError`] is mostly seen by transport
//! implementors.

use core_config::ConfigError;
use thiserror::Error;

/// Gateway configuration is incomplete or unusable. Fatal at construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// One or more required keys are absent. Every missing key is listed.
    #[error("Missing required configuration keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// A key is present but its value cannot be used.
    #[error("Invalid configuration value for '{key}': {details}")]
    InvalidValue { key: String, details: String },

    /// The SMTP transport could not be created from the configuration.
    #[error("Failed to create mail transport: {0}")]
    Transport(String),
}

impl From<ConfigError> for ConfigurationError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingEnvVar(key) => Self::MissingKeys(vec![key]),
            ConfigError::MissingEnvVars(keys) => Self::MissingKeys(keys),
            ConfigError::ParseError { key, details } => Self::InvalidValue { key, details },
        }
    }
}

/// Caller input cannot be normalized into an [`EmailSpec`](crate::EmailSpec).
///
/// Always raised before the transport is contacted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent after defaults were merged.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A recipient field carries an empty address.
    #[error("Recipient field '{0}' has an empty address")]
    EmptyRecipient(&'static str),

    /// A structured body has neither an `html` nor a `plain` part.
    #[error("Message body must contain an html or a plain part")]
    EmptyBody,

    /// Loose input does not have any of the accepted shapes.
    #[error("Malformed {what}: {details}")]
    Malformed { what: &'static str, details: String },
}

/// Failure raised by a [`MailTransport`](crate::transport::MailTransport).
///
/// Displays as the underlying description only; the gateway copies that
/// text verbatim into the failed [`Response`](crate::Response).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server could not be reached or the connection dropped.
    #[error("{0}")]
    Connection(String),

    /// The server refused the credentials.
    #[error("{0}")]
    Authentication(String),

    /// The server permanently refused the message.
    #[error("{0}")]
    Rejected(String),

    /// The outbound message could not be encoded for this transport.
    #[error("{0}")]
    InvalidMessage(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Authentication(_) => "authentication",
            Self::Rejected(_) => "rejected",
            Self::InvalidMessage(_) => "invalid_message",
            Self::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_lists_every_key() {
        let err = ConfigurationError::MissingKeys(vec!["host".to_string(), "from".to_string()]);
        assert_eq!(err.to_string(), "Missing required configuration keys: host, from");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ConfigurationError =
            ConfigError::MissingEnvVars(vec!["MAIL_HOST".to_string()]).into();
        assert_eq!(err, ConfigurationError::MissingKeys(vec!["MAIL_HOST".to_string()]));

        let err: ConfigurationError = ConfigError::ParseError {
            key: "MAIL_PORT".to_string(),
            details: "invalid digit".to_string(),
        }
        .into();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref key, .. } if key == "MAIL_PORT"));
    }

    #[test]
    fn test_transport_error_displays_description_only() {
        let err = TransportError::Connection("Connection refused".to_string());
        assert_eq!(err.to_string(), "Connection refused");
        assert_eq!(err.kind(), "connection");
    }
}
