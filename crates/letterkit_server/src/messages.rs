//! JSON request and response bodies for the generation endpoint.

use crate::error::{ServerError, ServerResult};
use letterkit_core::{char_len, Language, LetterSnapshot};
use serde::{Deserialize, Serialize};

/// Longest accepted prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Longest accepted value for the short fields (names, subject, tone).
pub const MAX_FIELD_CHARS: usize = 200;

/// Parameters describing the letter to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Free-form description of the letter.
    pub prompt: String,
    /// Target language.
    #[serde(default)]
    pub language: Language,
    /// Recipient honorific or title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_title: Option<String>,
    /// Recipient name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    /// Recipient organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_organization: Option<String>,
    /// Requested subject, if the user already has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Requested tone, e.g. "formal".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

impl GenerateRequest {
    /// Creates a request with just a prompt and language.
    pub fn new(prompt: impl Into<String>, language: Language) -> Self {
        Self {
            prompt: prompt.into(),
            language,
            recipient_title: None,
            recipient_name: None,
            recipient_organization: None,
            subject: None,
            tone: None,
        }
    }

    /// Sets the recipient name.
    pub fn with_recipient_name(mut self, name: impl Into<String>) -> Self {
        self.recipient_name = Some(name.into());
        self
    }

    /// Sets the requested subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the requested tone.
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    /// Checks the request against length and presence rules.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidRequest`] naming the first bad field.
    pub fn validate(&self) -> ServerResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(ServerError::InvalidRequest("prompt must not be empty".into()));
        }
        if char_len(&self.prompt) > MAX_PROMPT_CHARS {
            return Err(ServerError::InvalidRequest(format!(
                "prompt exceeds {MAX_PROMPT_CHARS} characters"
            )));
        }

        let short_fields = [
            ("recipientTitle", &self.recipient_title),
            ("recipientName", &self.recipient_name),
            ("recipientOrganization", &self.recipient_organization),
            ("subject", &self.subject),
            ("tone", &self.tone),
        ];
        for (name, value) in short_fields {
            if let Some(value) = value {
                if char_len(value) > MAX_FIELD_CHARS {
                    return Err(ServerError::InvalidRequest(format!(
                        "{name} exceeds {MAX_FIELD_CHARS} characters"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Generated letter fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Letter body.
    pub content: String,
    /// Subject line.
    pub subject: String,
    /// Closing phrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing: Option<String>,
    /// Recipient title suggested by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_title: Option<String>,
    /// Recipient name suggested by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    /// Recipient organization suggested by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_organization: Option<String>,
}

impl GenerateResponse {
    /// Creates a response with body and subject.
    pub fn new(content: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            subject: subject.into(),
            closing: None,
            recipient_title: None,
            recipient_name: None,
            recipient_organization: None,
        }
    }

    /// Sets the closing phrase.
    pub fn with_closing(mut self, closing: impl Into<String>) -> Self {
        self.closing = Some(closing.into());
        self
    }

    /// Produces the next letter state: generated fields replace those in
    /// `base`, everything else (date, signature, language) is kept.
    pub fn merge_into(&self, base: &LetterSnapshot) -> LetterSnapshot {
        let mut next = base
            .clone()
            .with_content(self.content.clone())
            .with_subject(self.subject.clone());
        if let Some(closing) = &self.closing {
            next.closing = Some(closing.clone());
        }
        if let Some(title) = &self.recipient_title {
            next.recipient_title = Some(title.clone());
        }
        if let Some(name) = &self.recipient_name {
            next.recipient_name = Some(name.clone());
        }
        if let Some(organization) = &self.recipient_organization {
            next.recipient_organization = Some(organization.clone());
        }
        next
    }
}

/// Body returned with an error status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Seconds to wait before retrying (rate limiting only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl From<&ServerError> for ErrorBody {
    fn from(error: &ServerError) -> Self {
        Self {
            error: error.to_string(),
            retry_after_secs: error.retry_after_secs(),
        }
    }
}
