//! Letter snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of a letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// Arabic (right-to-left).
    #[default]
    #[serde(rename = "ar")]
    Arabic,
    /// English (left-to-right).
    #[serde(rename = "en")]
    English,
}

/// Writing direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    /// Right-to-left.
    Rtl,
    /// Left-to-right.
    Ltr,
}

impl Language {
    /// Returns the short language tag (`"ar"` or `"en"`).
    pub fn code(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::English => "en",
        }
    }

    /// Returns the writing direction.
    pub fn direction(&self) -> TextDirection {
        match self {
            Language::Arabic => TextDirection::Rtl,
            Language::English => TextDirection::Ltr,
        }
    }

    /// Parses a language tag. Accepts `ar`/`en` and their long names.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ar" | "arabic" => Some(Language::Arabic),
            "en" | "english" => Some(Language::English),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One point-in-time state of a letter.
///
/// Snapshots are plain values. Every field is a string (or an optional
/// string); there are no nested structures. Once built they are never
/// mutated in place; the `with_*` setters consume and return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LetterSnapshot {
    /// Body text.
    pub content: String,
    /// Pre-formatted date line.
    #[serde(default)]
    pub date: String,
    /// Recipient honorific or title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_title: Option<String>,
    /// Recipient name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    /// Recipient organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_organization: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Signature block; may embed an image reference such as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Closing phrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing: Option<String>,
    /// Letter language.
    #[serde(default)]
    pub language: Language,
}

impl LetterSnapshot {
    /// Creates a snapshot with the given body and language.
    pub fn new(content: impl Into<String>, language: Language) -> Self {
        Self {
            content: content.into(),
            language,
            ..Self::default()
        }
    }

    /// Sets the date line.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the recipient title.
    pub fn with_recipient_title(mut self, title: impl Into<String>) -> Self {
        self.recipient_title = Some(title.into());
        self
    }

    /// Sets the recipient name.
    pub fn with_recipient_name(mut self, name: impl Into<String>) -> Self {
        self.recipient_name = Some(name.into());
        self
    }

    /// Sets the recipient organization.
    pub fn with_recipient_organization(mut self, organization: impl Into<String>) -> Self {
        self.recipient_organization = Some(organization.into());
        self
    }

    /// Sets the signature.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Sets the closing phrase.
    pub fn with_closing(mut self, closing: impl Into<String>) -> Self {
        self.closing = Some(closing.into());
        self
    }

    /// Replaces the body, keeping every other field.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Returns true if every text field is empty or unset.
    pub fn is_blank(&self) -> bool {
        let empty = |field: &Option<String>| field.as_deref().map_or(true, str::is_empty);
        self.content.is_empty()
            && self.date.is_empty()
            && self.subject.is_empty()
            && empty(&self.recipient_title)
            && empty(&self.recipient_name)
            && empty(&self.recipient_organization)
            && empty(&self.signature)
            && empty(&self.closing)
    }
}

/// Produces a [`LetterSnapshot`] from the caller's current form state.
///
/// Callers implement this on whatever holds their form fields and hand it
/// to [`HistoryBuffer::checkpoint`](crate::HistoryBuffer::checkpoint).
pub trait SnapshotSource {
    /// Captures the current state as a snapshot.
    fn snapshot(&self) -> LetterSnapshot;
}

impl SnapshotSource for LetterSnapshot {
    fn snapshot(&self) -> LetterSnapshot {
        self.clone()
    }
}

impl<F> SnapshotSource for F
where
    F: Fn() -> LetterSnapshot,
{
    fn snapshot(&self) -> LetterSnapshot {
        self()
    }
}
