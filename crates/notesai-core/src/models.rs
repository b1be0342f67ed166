//! Core data models for NotesAI.
//!
//! These types are shared across all NotesAI crates and represent the core
//! domain entities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults;
use crate::error::Error;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A single note as persisted in `notes.json`.
///
/// The id is the key of the enclosing mapping and is not repeated in the
/// record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub modified: DateTime<Utc>,
    pub category: String,
}

/// Legacy documents stored second-resolution `YYYY-mm-dd HH:MM:SS` stamps.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an RFC 3339 timestamp, or a legacy `YYYY-mm-dd HH:MM:SS` one (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT)
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

impl Note {
    /// A fresh note with default title and category and empty content.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            title: defaults::NOTE_TITLE.to_string(),
            content: String::new(),
            created: now,
            modified: now,
            category: defaults::NOTE_CATEGORY.to_string(),
        }
    }

    /// Advance `modified`.
    ///
    /// The new value is strictly later than the previous one even when the
    /// clock has not moved since the last edit.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.modified = if now > self.modified {
            now
        } else {
            self.modified + Duration::microseconds(1)
        };
    }

    /// Case-insensitive substring match over title, content, and category.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// OPERATION TYPES
// =============================================================================

/// The canned text transformations a provider can be asked for.
///
/// Wire names match the keys of `prompts.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "correction")]
    Correction,
    #[serde(rename = "resume")]
    Summary,
    #[serde(rename = "categorie")]
    Categorization,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::Correction,
        Operation::Summary,
        Operation::Categorization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correction => "correction",
            Self::Summary => "resume",
            Self::Categorization => "categorie",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correction" => Ok(Self::Correction),
            "resume" => Ok(Self::Summary),
            "categorie" => Ok(Self::Categorization),
            other => Err(Error::UnknownOperation(other.to_string())),
        }
    }
}

// =============================================================================
// PROVIDER TYPES
// =============================================================================

/// Coarse transport classification: local servers need no credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Local,
    Cloud,
}

/// Request/response shape spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `{model, prompt, stream}` in, `{response}` out.
    Local,
    /// `{model, messages}` in, `{choices[].message.content}` out, bearer auth.
    ChatCompletion,
    /// `{model, max_tokens, messages}` in, `{content[].text}` out, API-key header.
    Messages,
}

impl ProviderKind {
    pub fn transport(&self) -> TransportKind {
        match self {
            Self::Local => TransportKind::Local,
            Self::ChatCompletion | Self::Messages => TransportKind::Cloud,
        }
    }

    pub fn requires_credential(&self) -> bool {
        self.transport() == TransportKind::Cloud
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::ChatCompletion => write!(f, "chat_completion"),
            Self::Messages => write!(f, "messages"),
        }
    }
}

/// A known AI provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub endpoint_url: String,
    /// Model used for requests; replaced by `set_model`.
    pub model: String,
    pub kind: ProviderKind,
}

impl ProviderDescriptor {
    pub fn new(
        name: impl Into<String>,
        endpoint_url: impl Into<String>,
        model: impl Into<String>,
        kind: ProviderKind,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint_url: endpoint_url.into(),
            model: model.into(),
            kind,
        }
    }
}

// =============================================================================
// RESULT ENVELOPE
// =============================================================================

/// Classification of a failed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    EmptyContent,
    UnknownOperation,
    MissingCredential,
    UnsupportedProvider,
    Http,
    Unexpected,
}

impl From<&Error> for FailureKind {
    fn from(err: &Error) -> Self {
        match err {
            Error::EmptyContent => Self::EmptyContent,
            Error::UnknownOperation(_) => Self::UnknownOperation,
            Error::MissingCredential(_) => Self::MissingCredential,
            Error::UnsupportedProvider(_) => Self::UnsupportedProvider,
            Error::Provider { .. } => Self::Http,
            _ => Self::Unexpected,
        }
    }
}

/// Uniform outcome of a dispatch, delivered to the caller's callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEnvelope {
    Success {
        operation: Operation,
        result: String,
    },
    Failure {
        kind: FailureKind,
        error: String,
    },
}

impl ResultEnvelope {
    pub fn success(operation: Operation, result: impl Into<String>) -> Self {
        Self::Success {
            operation,
            result: result.into(),
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self::Failure {
            kind: FailureKind::from(err),
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn result(&self) -> Option<&str> {
        match self {
            Self::Success { result, .. } => Some(result),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// `{success, operation, result}` or `{success, error}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Success { operation, result } => serde_json::json!({
                "success": true,
                "operation": operation.as_str(),
                "result": result,
            }),
            Self::Failure { error, .. } => serde_json::json!({
                "success": false,
                "error": error,
            }),
        }
    }
}

impl From<Error> for ResultEnvelope {
    fn from(err: Error) -> Self {
        Self::failure(&err)
    }
}
