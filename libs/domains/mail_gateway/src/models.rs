use serde::{Deserialize, Serialize};
use std::fmt;

/// An email address, optionally paired with a display name.
///
/// Deserializes from a bare string (`"a@x.com"`) or a two-element array
/// (`["a@x.com", "Alice"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    /// Bare address, no display name
    Address(String),
    /// (address, display name)
    Named(String, String),
}

impl Recipient {
    /// Create a recipient with a display name.
    pub fn named(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(address.into(), name.into())
    }

    pub fn address(&self) -> &str {
        match self {
            Self::Address(address) | Self::Named(address, _) => address,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Address(_) => None,
            Self::Named(_, name) => Some(name),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{}", address),
            Self::Named(address, name) => write!(f, "{} <{}>", name, address),
        }
    }
}

impl From<&str> for Recipient {
    fn from(address: &str) -> Self {
        Self::Address(address.to_string())
    }
}

impl From<String> for Recipient {
    fn from(address: String) -> Self {
        Self::Address(address)
    }
}

impl<A: Into<String>, N: Into<String>> From<(A, N)> for Recipient {
    fn from((address, name): (A, N)) -> Self {
        Self::named(address, name)
    }
}

/// Message priority, 1 (highest) to 5 (lowest).
///
/// Out-of-range values are clamped into range rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Self = Self(1);
    pub const HIGH: Self = Self(2);
    pub const NORMAL: Self = Self(3);
    pub const LOW: Self = Self(4);
    pub const LOWEST: Self = Self(5);

    /// Label used in the `X-Priority` header.
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Highest",
            2 => "High",
            3 => "Normal",
            4 => "Low",
            _ => "Lowest",
        }
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self(value.clamp(1, 5) as u8)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// Normalized message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    /// Plain content with no declared type
    Plain(String),
    /// HTML only
    Html(String),
    /// HTML with a plain-text alternative
    Both { html: String, plain: String },
}

impl Body {
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Html(html) | Self::Both { html, .. } => Some(html),
            Self::Plain(_) => None,
        }
    }

    pub fn plain(&self) -> Option<&str> {
        match self {
            Self::Plain(plain) | Self::Both { plain, .. } => Some(plain),
            Self::Html(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::Html(_) => "html",
            Self::Both { .. } => "both",
        }
    }
}

/// Canonical, fully normalized description of one outbound email.
///
/// Only the [`Normalizer`](crate::Normalizer) builds these; once built
/// it is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSpec {
    pub(crate) to: Recipient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) cc: Option<Recipient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) bcc: Option<Recipient>,
    pub(crate) from: Recipient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) return_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) priority: Option<Priority>,
    pub(crate) subject: String,
    pub(crate) body: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) content_type: Option<String>,
}

impl EmailSpec {
    pub fn to(&self) -> &Recipient {
        &self.to
    }

    pub fn cc(&self) -> Option<&Recipient> {
        self.cc.as_ref()
    }

    pub fn bcc(&self) -> Option<&Recipient> {
        self.bcc.as_ref()
    }

    pub fn from(&self) -> &Recipient {
        &self.from
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn return_path(&self) -> Option<&str> {
        self.return_path.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}
