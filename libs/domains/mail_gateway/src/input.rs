//! Caller-facing input shapes.
//!
//! These mirror what callers actually send: bare strings, recipient pairs,
//! and loosely filled maps. Every type deserializes from JSON, and keys
//! outside the known set are dropped during deserialization.

use crate::error::ValidationError;
use crate::models::{Priority, Recipient};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `to` argument of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipientInput {
    /// A single recipient
    Single(Recipient),
    /// A primary recipient carrying its own copies
    Detailed {
        to: Recipient,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cc: Option<Recipient>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bcc: Option<Recipient>,
    },
}

impl RecipientInput {
    /// Attach a carbon copy, keeping any existing blind copy.
    pub fn with_cc(self, cc: impl Into<Recipient>) -> Self {
        let (to, _, bcc) = self.into_parts();
        Self::Detailed {
            to,
            cc: Some(cc.into()),
            bcc,
        }
    }

    /// Attach a blind carbon copy, keeping any existing carbon copy.
    pub fn with_bcc(self, bcc: impl Into<Recipient>) -> Self {
        let (to, cc, _) = self.into_parts();
        Self::Detailed {
            to,
            cc,
            bcc: Some(bcc.into()),
        }
    }

    /// Split into (primary, cc, bcc).
    pub fn into_parts(self) -> (Recipient, Option<Recipient>, Option<Recipient>) {
        match self {
            Self::Single(to) => (to, None, None),
            Self::Detailed { to, cc, bcc } => (to, cc, bcc),
        }
    }
}

impl From<Recipient> for RecipientInput {
    fn from(recipient: Recipient) -> Self {
        Self::Single(recipient)
    }
}

impl From<&str> for RecipientInput {
    fn from(address: &str) -> Self {
        Self::Single(address.into())
    }
}

impl From<String> for RecipientInput {
    fn from(address: String) -> Self {
        Self::Single(address.into())
    }
}

impl<A: Into<String>, N: Into<String>> From<(A, N)> for RecipientInput {
    fn from(pair: (A, N)) -> Self {
        Self::Single(pair.into())
    }
}

impl TryFrom<Value> for RecipientInput {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Object(map) = &value {
            if map.get("to").is_none_or(Value::is_null) {
                return Err(ValidationError::MissingField("to"));
            }
        }

        serde_json::from_value(value).map_err(|e| ValidationError::Malformed {
            what: "recipient",
            details: e.to_string(),
        })
    }
}

/// A message body as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyInput {
    /// Bare content; sniffed for markup during normalization
    Text(String),
    /// Explicit parts, passed through unchanged
    Parts {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plain: Option<String>,
    },
}

impl BodyInput {
    pub fn parts(html: impl Into<String>, plain: impl Into<String>) -> Self {
        Self::Parts {
            html: Some(html.into()),
            plain: Some(plain.into()),
        }
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self::Parts {
            html: Some(html.into()),
            plain: None,
        }
    }
}

impl From<&str> for BodyInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for BodyInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Named message fields. Used both per call and as gateway defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Recipient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Recipient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Recipient>,
    /// Any form the transport can parse. Unix timestamps may arrive as numbers.
    #[serde(
        default,
        deserialize_with = "text_or_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl MessageFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read fields from a JSON map. Unknown keys are ignored.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map))
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<BodyInput>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<Recipient>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn with_cc(mut self, cc: impl Into<Recipient>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<Recipient>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_return_path(mut self, return_path: impl Into<String>) -> Self {
        self.return_path = Some(return_path.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Two-layer lookup: every field set here wins, every field left
    /// unset falls back to `defaults`.
    pub fn layered_over(self, defaults: &MessageFields) -> MessageFields {
        MessageFields {
            subject: self.subject.or_else(|| defaults.subject.clone()),
            body: self.body.or_else(|| defaults.body.clone()),
            from: self.from.or_else(|| defaults.from.clone()),
            reply_to: self.reply_to.or_else(|| defaults.reply_to.clone()),
            cc: self.cc.or_else(|| defaults.cc.clone()),
            bcc: self.bcc.or_else(|| defaults.bcc.clone()),
            date: self.date.or_else(|| defaults.date.clone()),
            content_type: self.content_type.or_else(|| defaults.content_type.clone()),
            return_path: self.return_path.or_else(|| defaults.return_path.clone()),
            id: self.id.or_else(|| defaults.id.clone()),
            priority: self.priority.or(defaults.priority),
        }
    }
}

/// The `message` argument of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageInput {
    /// A bare string: becomes the body, and a shortened copy the subject
    Text(String),
    #[serde(deserialize_with = "fields_from_map")]
    Fields(MessageFields),
}

// A derived struct also deserializes from a sequence, filling fields by
// position. Message fields are only ever named.
fn fields_from_map<'de, D>(deserializer: D) -> Result<MessageFields, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Map::<String, Value>::deserialize(deserializer)?;
    MessageFields::from_map(map).map_err(de::Error::custom)
}

fn text_or_integer<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Integer(n) => n.to_string(),
    }))
}

impl From<&str> for MessageInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<MessageFields> for MessageInput {
    fn from(fields: MessageFields) -> Self {
        Self::Fields(fields)
    }
}

impl TryFrom<Value> for MessageInput {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed {
            what: "message",
            details: e.to_string(),
        })
    }
}
