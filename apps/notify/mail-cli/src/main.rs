//! Mail CLI
//!
//! Sends a single notification through the mail gateway, using SMTP
//! settings from `MAIL_*` environment variables. Prints the resulting
//! response as JSON and exits non-zero when the message was not delivered.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::Environment;
use eyre::{Result, WrapErr};
use mail_gateway::normalizer::derive_subject;
use mail_gateway::{Gateway, GatewayConfig, MessageFields, MessageInput, RecipientInput, Response};
use tracing::info;

#[derive(Parser)]
#[command(name = "mail-cli")]
#[command(about = "Send notifications through the mail gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a notification
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Display name for the recipient
        #[arg(long)]
        to_name: Option<String>,

        /// Carbon copy address
        #[arg(long)]
        cc: Option<String>,

        /// Blind carbon copy address
        #[arg(long)]
        bcc: Option<String>,

        /// Subject line. Derived from the body when omitted.
        #[arg(short, long)]
        subject: Option<String>,

        /// Sender address, overriding MAIL_FROM
        #[arg(long)]
        from: Option<String>,

        /// Display name for the sender
        #[arg(long, requires = "from")]
        from_name: Option<String>,

        /// Reply-To address
        #[arg(long)]
        reply_to: Option<String>,

        /// Message body. HTML gets a plain-text alternative.
        body: String,
    },

    /// Send a notification given as raw JSON recipient and message values
    SendJson {
        /// Recipient, e.g. '"a@x.com"' or '{"to": "a@x.com", "cc": "b@x.com"}'
        to: String,

        /// Message, e.g. '"Hello"' or '{"subject": "S", "body": "<p>Hi</p>"}'
        message: String,
    },

    /// Check that the SMTP server is reachable
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();

    let config = GatewayConfig::from_env().wrap_err("Failed to load mail configuration")?;
    let gateway = Gateway::from_config(config)?;

    match cli.command {
        Commands::Send {
            to,
            to_name,
            cc,
            bcc,
            subject,
            from,
            from_name,
            reply_to,
            body,
        } => {
            let to = recipient(to, to_name, cc, bcc);
            let overrides = Overrides {
                subject,
                from,
                from_name,
                reply_to,
            };
            let response = gateway.notify(to, message_input(body, overrides)).await?;
            report(&response)?;
        }

        Commands::SendJson { to, message } => {
            let to: serde_json::Value =
                serde_json::from_str(&to).wrap_err("Recipient is not valid JSON")?;
            let message: serde_json::Value =
                serde_json::from_str(&message).wrap_err("Message is not valid JSON")?;
            let response = gateway.notify_json(to, message).await?;
            report(&response)?;
        }

        Commands::Check => {
            gateway.health_check().await?;
            info!(transport = gateway.transport_name(), "Mail server reachable");
            println!("ok");
        }
    }

    Ok(())
}

fn recipient(
    to: String,
    name: Option<String>,
    cc: Option<String>,
    bcc: Option<String>,
) -> RecipientInput {
    let mut input = match name {
        Some(name) => RecipientInput::from((to, name)),
        None => RecipientInput::from(to),
    };
    if let Some(cc) = cc {
        input = input.with_cc(cc);
    }
    if let Some(bcc) = bcc {
        input = input.with_bcc(bcc);
    }
    input
}

/// Optional `send` flags that turn a bare body into a structured message.
#[derive(Default)]
struct Overrides {
    subject: Option<String>,
    from: Option<String>,
    from_name: Option<String>,
    reply_to: Option<String>,
}

fn message_input(body: String, overrides: Overrides) -> MessageInput {
    let Overrides {
        subject,
        from,
        from_name,
        reply_to,
    } = overrides;

    if subject.is_none() && from.is_none() && reply_to.is_none() {
        return MessageInput::from(body);
    }

    let subject = subject.unwrap_or_else(|| derive_subject(&body));
    let mut fields = MessageFields::new().with_subject(subject).with_body(body);
    if let Some(from) = from {
        fields = match from_name {
            Some(name) => fields.with_from((from, name)),
            None => fields.with_from(from),
        };
    }
    if let Some(reply_to) = reply_to {
        fields = fields.with_reply_to(reply_to);
    }
    fields.into()
}

fn report(response: &Response) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if !response.success() {
        eyre::bail!("Notification not delivered: {}", response.message());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail_gateway::Recipient;

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "mail-cli", "send", "--to", "a@x.com", "--cc", "b@x.com", "-s", "Greetings", "Hello",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                to,
                to_name,
                cc,
                bcc,
                subject,
                from,
                body,
                ..
            } => {
                assert_eq!(to, "a@x.com");
                assert_eq!(to_name, None);
                assert_eq!(cc.as_deref(), Some("b@x.com"));
                assert_eq!(bcc, None);
                assert_eq!(subject.as_deref(), Some("Greetings"));
                assert_eq!(from, None);
                assert_eq!(body, "Hello");
            }
            _ => panic!("Expected send command"),
        }
    }

    #[test]
    fn test_parse_rejects_incomplete_send() {
        assert!(Cli::try_parse_from(["mail-cli", "send", "Hello"]).is_err());
        assert!(Cli::try_parse_from(["mail-cli", "send", "--to", "a@x.com"]).is_err());
        assert!(
            Cli::try_parse_from(["mail-cli", "send", "--to", "a@x.com", "--from-name", "Ops", "Hi"])
                .is_err()
        );
    }

    #[test]
    fn test_parse_send_json_and_check() {
        let cli = Cli::try_parse_from(["mail-cli", "send-json", r#""a@x.com""#, r#""Hi""#]).unwrap();
        assert!(matches!(cli.command, Commands::SendJson { .. }));

        let cli = Cli::try_parse_from(["mail-cli", "check"]).unwrap();
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_recipient_with_name_and_copies() {
        let input = recipient(
            "a@x.com".to_string(),
            Some("Alice".to_string()),
            Some("b@x.com".to_string()),
            None,
        );
        let (to, cc, bcc) = input.into_parts();
        assert_eq!(to, Recipient::named("a@x.com", "Alice"));
        assert_eq!(cc, Some(Recipient::from("b@x.com")));
        assert_eq!(bcc, None);
    }

    #[test]
    fn test_bare_body_without_overrides() {
        assert_eq!(
            message_input("Hello".to_string(), Overrides::default()),
            MessageInput::Text("Hello".to_string())
        );
    }

    #[test]
    fn test_overrides_build_structured_message() {
        let overrides = Overrides {
            from: Some("ops@example.com".to_string()),
            from_name: Some("Ops".to_string()),
            reply_to: Some("help@example.com".to_string()),
            ..Overrides::default()
        };

        match message_input("Disk full".to_string(), overrides) {
            MessageInput::Fields(fields) => {
                assert_eq!(fields.subject.as_deref(), Some("Disk full..."));
                assert_eq!(fields.from, Some(Recipient::named("ops@example.com", "Ops")));
                assert_eq!(fields.reply_to.as_deref(), Some("help@example.com"));
            }
            other => panic!("Expected structured message, got {:?}", other),
        }
    }
}
