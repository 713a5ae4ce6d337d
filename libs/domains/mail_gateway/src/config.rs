//! Gateway configuration.

use crate::error::ConfigurationError;
use crate::input::MessageFields;
use crate::models::Recipient;
use core_config::{smtp::SmtpEnv, FromEnv};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Keys a configuration map must carry, in the order they are reported.
pub const REQUIRED_KEYS: [&str; 6] = ["host", "port", "encryption", "username", "password", "from"];

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryption {
    /// Plaintext. Only for local catchers such as Mailpit.
    None,
    /// Implicit TLS from the first byte
    Ssl,
    /// Plaintext upgraded with STARTTLS
    StartTls,
}

impl FromStr for Encryption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssl" => Ok(Self::Ssl),
            "tls" | "starttls" => Ok(Self::StartTls),
            "" | "none" => Ok(Self::None),
            other => Err(format!(
                "unknown encryption '{}', expected ssl, tls or none",
                other
            )),
        }
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Ssl => write!(f, "ssl"),
            Self::StartTls => write!(f, "tls"),
        }
    }
}

/// Everything needed to build an SMTP-backed gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub encryption: Encryption,
    pub username: String,
    pub password: String,
    /// Default sender
    pub from: Recipient,
    /// Default message fields merged under every call
    pub defaults: MessageFields,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
struct RawConfig {
    host: String,
    port: PortValue,
    encryption: String,
    username: String,
    password: String,
    from: Recipient,
    #[serde(default)]
    defaults: Option<Value>,
}

impl GatewayConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        encryption: Encryption,
        username: impl Into<String>,
        password: impl Into<String>,
        from: impl Into<Recipient>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            encryption,
            username: username.into(),
            password: password.into(),
            from: from.into(),
            defaults: MessageFields::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: MessageFields) -> Self {
        self.defaults = defaults;
        self
    }

    /// Load from a loose configuration map.
    ///
    /// A key set to `null` counts as missing. Every missing key is
    /// reported in one error.
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        let Value::Object(map) = value else {
            return Err(invalid("config", "expected a map of settings"));
        };

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| map.get(**key).is_none_or(Value::is_null))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigurationError::MissingKeys(missing));
        }

        let raw: RawConfig =
            serde_json::from_value(Value::Object(map)).map_err(|e| invalid("config", e))?;

        let port = match raw.port {
            PortValue::Number(n) => u16::try_from(n).map_err(|e| invalid("port", e))?,
            PortValue::Text(s) => s.trim().parse::<u16>().map_err(|e| invalid("port", e))?,
        };
        let encryption = raw
            .encryption
            .parse::<Encryption>()
            .map_err(|e| invalid("encryption", e))?;

        Ok(Self {
            host: raw.host,
            port,
            encryption,
            username: raw.username,
            password: raw.password,
            from: raw.from,
            defaults: defaults_from("defaults", raw.defaults)?,
        })
    }

    /// Load from `MAIL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let env = SmtpEnv::from_env()?;

        let encryption = env
            .encryption
            .parse::<Encryption>()
            .map_err(|e| invalid("MAIL_ENCRYPTION", e))?;
        let defaults = match env.defaults.as_deref() {
            Some(json) => {
                let value = serde_json::from_str::<Value>(json)
                    .map_err(|e| invalid("MAIL_DEFAULTS", e))?;
                defaults_from("MAIL_DEFAULTS", Some(value))?
            }
            None => MessageFields::default(),
        };
        let from = match env.from_name {
            Some(name) => Recipient::named(env.from_address, name),
            None => Recipient::Address(env.from_address),
        };

        Ok(Self {
            host: env.host,
            port: env.port,
            encryption,
            username: env.username,
            password: env.password,
            from,
            defaults,
        })
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("encryption", &self.encryption)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .field("defaults", &self.defaults)
            .finish()
    }
}

fn defaults_from(key: &str, value: Option<Value>) -> Result<MessageFields, ConfigurationError> {
    match value {
        None | Some(Value::Null) => Ok(MessageFields::default()),
        Some(Value::Object(map)) => MessageFields::from_map(map).map_err(|e| invalid(key, e)),
        Some(_) => Err(invalid(key, "expected a map of message fields")),
    }
}

fn invalid(key: &str, details: impl fmt::Display) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        key: key.to_string(),
        details: details.to_string(),
    }
}
