use crate::{env_optional, env_required_all, ConfigError, FromEnv};

/// Environment variable names read by [`SmtpEnv::from_env`], in the order
/// they are reported when missing.
pub const REQUIRED_VARS: [&str; 6] = [
    "MAIL_HOST",
    "MAIL_PORT",
    "MAIL_ENCRYPTION",
    "MAIL_USERNAME",
    "MAIL_PASSWORD",
    "MAIL_FROM",
];

/// Raw SMTP settings as they appear in the process environment.
///
/// Values are kept as strings apart from the port; interpreting the
/// encryption mode and the defaults document is left to the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmtpEnv {
    pub host: String,
    pub port: u16,
    pub encryption: String,
    pub username: String,
    pub password: String,
    pub from_address: String,
    /// `MAIL_FROM_NAME`
    pub from_name: Option<String>,
    /// `MAIL_DEFAULTS`, a JSON object of default message fields
    pub defaults: Option<String>,
}

impl FromEnv for SmtpEnv {
    fn from_env() -> Result<Self, ConfigError> {
        let [host, port, encryption, username, password, from_address] =
            env_required_all(REQUIRED_VARS)?;

        let port = port.trim().parse().map_err(|e| ConfigError::ParseError {
            key: "MAIL_PORT".to_string(),
            details: format!("{}", e),
        })?;

        Ok(Self {
            host,
            port,
            encryption,
            username,
            password,
            from_address,
            from_name: env_optional("MAIL_FROM_NAME"),
            defaults: env_optional("MAIL_DEFAULTS"),
        })
    }
}
