use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const BEARER_SCHEME: &str = "Bearer";

/// Opaque per-upload credential. Doubles as the dataset's storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Fresh random token (hyphenated UUIDv4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a header value. Accepts a raw token or `Bearer <token>`.
    /// Returns `None` for blank values.
    pub fn from_header_value(value: &str) -> Option<Self> {
        let value = value.trim();
        let value = match value.split_once(char::is_whitespace) {
            Some((BEARER_SCHEME, rest)) => rest.trim(),
            _ if value == BEARER_SCHEME => "",
            _ => value,
        };
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the token can be used as a file name without escaping
    /// the storage directory.
    pub fn is_storage_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    }

    /// Short prefix for log lines.
    pub fn redacted(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
