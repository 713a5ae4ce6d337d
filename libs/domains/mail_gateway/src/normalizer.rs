//! Turns caller input into an [`EmailSpec`].
//!
//! Precedence, highest first:
//!
//! | field | sources |
//! |---|---|
//! | `cc`, `bcc` | copies attached to `to` → message field → gateway default |
//! | `from` | message field → gateway default → gateway sender |
//! | everything else | message field → gateway default |
//!
//! A bare-string message becomes `{subject: <stripped, shortened>, body: <original>}`
//! before any of the above applies.

use crate::error::ValidationError;
use crate::html::{self, HtmdConverter, HtmlToText};
use crate::input::{BodyInput, MessageFields, MessageInput, RecipientInput};
use crate::models::{Body, EmailSpec, Recipient};
use std::sync::Arc;
use tracing::debug;

/// Longest subject, in characters, derived from a bare-string message.
pub const SUBJECT_MAX_CHARS: usize = 75;

/// Appended to every derived subject.
pub const SUBJECT_ELLIPSIS: &str = "...";

const HTML_CONTENT_TYPE: &str = "text/html";

/// Derive a subject line from a bare-string message.
pub fn derive_subject(text: &str) -> String {
    let mut subject: String = html::strip_tags(text)
        .chars()
        .take(SUBJECT_MAX_CHARS)
        .collect();
    subject.push_str(SUBJECT_ELLIPSIS);
    subject
}

/// Pure `(to, message) → EmailSpec` transformation.
#[derive(Clone)]
pub struct Normalizer {
    sender: Recipient,
    defaults: MessageFields,
    converter: Arc<dyn HtmlToText>,
}

impl Normalizer {
    pub fn new(sender: impl Into<Recipient>) -> Self {
        Self {
            sender: sender.into(),
            defaults: MessageFields::default(),
            converter: Arc::new(HtmdConverter),
        }
    }

    /// Gateway-level defaults, consulted for every field the call leaves unset.
    pub fn with_defaults(mut self, defaults: MessageFields) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn HtmlToText>) -> Self {
        self.converter = converter;
        self
    }

    pub fn sender(&self) -> &Recipient {
        &self.sender
    }

    pub fn normalize(
        &self,
        to: RecipientInput,
        message: MessageInput,
    ) -> Result<EmailSpec, ValidationError> {
        let (to, attached_cc, attached_bcc) = to.into_parts();
        require_address("to", &to)?;

        let fields = match message {
            MessageInput::Text(text) => MessageFields {
                subject: Some(derive_subject(&text)),
                body: Some(BodyInput::Text(text)),
                ..MessageFields::default()
            },
            MessageInput::Fields(fields) => fields,
        }
        .layered_over(&self.defaults);

        let subject = fields.subject.ok_or(ValidationError::MissingField("subject"))?;
        let body = fields.body.ok_or(ValidationError::MissingField("body"))?;
        let (body, inferred_content_type) = self.resolve_body(body)?;

        let from = fields.from.unwrap_or_else(|| self.sender.clone());
        require_address("from", &from)?;

        let cc = attached_cc.or(fields.cc);
        if let Some(cc) = &cc {
            require_address("cc", cc)?;
        }
        let bcc = attached_bcc.or(fields.bcc);
        if let Some(bcc) = &bcc {
            require_address("bcc", bcc)?;
        }

        let spec = EmailSpec {
            to,
            cc,
            bcc,
            from,
            reply_to: fields.reply_to,
            return_path: fields.return_path,
            id: fields.id,
            date: fields.date,
            priority: fields.priority,
            subject,
            body,
            content_type: fields.content_type.or(inferred_content_type),
        };

        debug!(
            to = %spec.to,
            from = %spec.from,
            has_cc = spec.cc.is_some(),
            has_bcc = spec.bcc.is_some(),
            body = spec.body.kind(),
            content_type = ?spec.content_type,
            "Normalized notification"
        );

        Ok(spec)
    }

    /// Bare strings are sniffed; explicit parts pass through untouched and
    /// never get an inferred content type.
    fn resolve_body(
        &self,
        body: BodyInput,
    ) -> Result<(Body, Option<String>), ValidationError> {
        match body {
            BodyInput::Text(text) if html::is_html(&text) => {
                let plain = self.converter.convert(&text);
                Ok((
                    Body::Both { html: text, plain },
                    Some(HTML_CONTENT_TYPE.to_string()),
                ))
            }
            BodyInput::Text(text) => Ok((Body::Plain(text), None)),
            BodyInput::Parts {
                html: Some(html),
                plain: Some(plain),
            } => Ok((Body::Both { html, plain }, None)),
            BodyInput::Parts {
                html: Some(html),
                plain: None,
            } => Ok((Body::Html(html), None)),
            BodyInput::Parts {
                html: None,
                plain: Some(plain),
            } => Ok((Body::Plain(plain), None)),
            BodyInput::Parts {
                html: None,
                plain: None,
            } => Err(ValidationError::EmptyBody),
        }
    }
}

fn require_address(field: &'static str, recipient: &Recipient) -> Result<(), ValidationError> {
    if recipient.address().trim().is_empty() {
        return Err(ValidationError::EmptyRecipient(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use serde_json::json;

    fn normalizer() -> Normalizer {
        Normalizer::new(Recipient::named("from@example.com", "Example Sender"))
            .with_converter(Arc::new(|html: &str| format!("converted:{}", html::strip_tags(html))))
    }

    fn structured(subject: &str, body: &str) -> MessageInput {
        MessageFields::new().with_subject(subject).with_body(body).into()
    }

    #[test]
    fn test_bare_message_derives_subject() {
        let spec = normalizer().normalize("a@x.com".into(), "Hello".into()).unwrap();
        assert_eq!(spec.subject(), "Hello...");
        assert_eq!(spec.body(), &Body::Plain("Hello".to_string()));
        assert_eq!(spec.to(), &Recipient::from("a@x.com"));
        assert_eq!(spec.content_type(), None);
    }

    #[test]
    fn test_bare_message_subject_is_stripped_and_truncated() {
        let long = format!("<h1>{}</h1>", "x".repeat(100));
        let spec = normalizer().normalize("a@x.com".into(), long.clone().into()).unwrap();
        assert_eq!(spec.subject(), format!("{}...", "x".repeat(75)));
        assert_eq!(spec.body().html(), Some(long.as_str()));
    }

    #[test]
    fn test_derive_subject_counts_characters_not_bytes() {
        let text = "é".repeat(80);
        let subject = derive_subject(&text);
        assert_eq!(subject.chars().count(), SUBJECT_MAX_CHARS + SUBJECT_ELLIPSIS.len());
    }

    #[test]
    fn test_html_body_gets_plain_rendition() {
        let spec = normalizer()
            .normalize("a@x.com".into(), structured("S", "<p>Hi</p>"))
            .unwrap();
        assert_eq!(
            spec.body(),
            &Body::Both {
                html: "<p>Hi</p>".to_string(),
                plain: "converted:Hi".to_string(),
            }
        );
        assert_eq!(spec.content_type(), Some("text/html"));
    }

    #[test]
    fn test_explicit_content_type_wins_over_inference() {
        let message = MessageFields::new()
            .with_subject("S")
            .with_body("<p>Hi</p>")
            .with_content_type("text/x-custom");
        let spec = normalizer().normalize("a@x.com".into(), message.into()).unwrap();
        assert_eq!(spec.content_type(), Some("text/x-custom"));
    }

    #[test]
    fn test_structured_body_passes_through_without_inference() {
        let message = MessageFields::new()
            .with_subject("S")
            .with_body(BodyInput::parts("<h1>Hi</h1>", "Hi plain"));
        let spec = normalizer().normalize("a@x.com".into(), message.into()).unwrap();
        assert_eq!(
            spec.body(),
            &Body::Both {
                html: "<h1>Hi</h1>".to_string(),
                plain: "Hi plain".to_string(),
            }
        );
        assert_eq!(spec.content_type(), None);

        let message = MessageFields::new().with_subject("S").with_body(BodyInput::html("<b>x</b>"));
        let spec = normalizer().normalize("a@x.com".into(), message.into()).unwrap();
        assert_eq!(spec.body(), &Body::Html("<b>x</b>".to_string()));
        assert_eq!(spec.content_type(), None);
    }

    #[test]
    fn test_empty_structured_body_is_rejected() {
        let message = MessageInput::try_from(json!({"subject": "S", "body": {}})).unwrap();
        let err = normalizer().normalize("a@x.com".into(), message).unwrap_err();
        assert_eq!(err, ValidationError::EmptyBody);
    }

    #[test]
    fn test_missing_subject_or_body() {
        let err = normalizer()
            .normalize("a@x.com".into(), MessageFields::new().with_body("B").into())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("subject"));

        let err = normalizer()
            .normalize("a@x.com".into(), MessageFields::new().with_subject("S").into())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("body"));
    }

    #[test]
    fn test_defaults_fill_missing_required_fields() {
        let normalizer = normalizer().with_defaults(MessageFields::new().with_subject("Notice"));
        let spec = normalizer
            .normalize("a@x.com".into(), MessageFields::new().with_body("B").into())
            .unwrap();
        assert_eq!(spec.subject(), "Notice");
    }

    #[test]
    fn test_empty_to_is_rejected() {
        let err = normalizer().normalize("  ".into(), "Hello".into()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyRecipient("to"));
    }

    #[test]
    fn test_from_precedence() {
        let spec = normalizer().normalize("a@x.com".into(), structured("S", "B")).unwrap();
        assert_eq!(spec.from(), &Recipient::named("from@example.com", "Example Sender"));

        let with_default = normalizer().with_defaults(MessageFields::new().with_from("team@example.com"));
        let spec = with_default.normalize("a@x.com".into(), structured("S", "B")).unwrap();
        assert_eq!(spec.from(), &Recipient::from("team@example.com"));

        let message = MessageFields::new()
            .with_subject("S")
            .with_body("B")
            .with_from("other@example.com");
        let spec = with_default.normalize("a@x.com".into(), message.into()).unwrap();
        assert_eq!(spec.from(), &Recipient::from("other@example.com"));
    }

    #[test]
    fn test_copies_attached_to_recipient_win() {
        let to = RecipientInput::from(("a@x.com", "Alice")).with_cc("b@x.com");
        let message = MessageFields::new()
            .with_subject("S")
            .with_body("B")
            .with_cc("ignored@x.com")
            .with_bcc(("c@x.com", "Carol"));
        let spec = normalizer().normalize(to, message.into()).unwrap();

        assert_eq!(spec.to(), &Recipient::named("a@x.com", "Alice"));
        assert_eq!(spec.cc(), Some(&Recipient::from("b@x.com")));
        assert_eq!(spec.bcc(), Some(&Recipient::named("c@x.com", "Carol")));
    }

    #[test]
    fn test_optional_fields_pass_through_only_when_present() {
        let message = MessageInput::try_from(json!({
            "subject": "Test",
            "body": "Body",
            "replyTo": "replyto@email.com",
            "returnPath": "bounces@email.com",
            "id": "111@email.com",
            "date": "660600626",
            "priority": 2,
            "unsupported": "dropped",
        }))
        .unwrap();
        let spec = normalizer().normalize("a@x.com".into(), message).unwrap();
        assert_eq!(spec.reply_to(), Some("replyto@email.com"));
        assert_eq!(spec.return_path(), Some("bounces@email.com"));
        assert_eq!(spec.id(), Some("111@email.com"));
        assert_eq!(spec.date(), Some("660600626"));
        assert_eq!(spec.priority(), Some(Priority::HIGH));

        let spec = normalizer().normalize("a@x.com".into(), structured("S", "B")).unwrap();
        let serialized = serde_json::to_value(&spec).unwrap();
        for absent in ["cc", "bcc", "replyTo", "returnPath", "id", "date", "priority", "contentType"] {
            assert!(serialized.get(absent).is_none(), "{absent} should be omitted");
        }
    }
}
