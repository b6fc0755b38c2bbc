//! Access token type
//!
//! The access token is an opaque bearer credential. Only the current value is
//! ever kept, and it never appears in full in `Debug` output or logs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Short-lived bearer credential attached to every outbound call.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyToken` if the value is blank.
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyToken);
        }
        Ok(Self(value))
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Returns a preview of the token suitable for logs (first 8 chars + ...).
    #[must_use]
    pub fn preview(&self) -> String {
        if self.0.len() > 12 {
            let cut = self
                .0
                .char_indices()
                .nth(8)
                .map_or(self.0.len(), |(idx, _)| idx);
            format!("{}...", &self.0[..cut])
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&self.preview()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejects_blank_token() {
        assert_eq!(AccessToken::new("  "), Err(DomainError::EmptyToken));
        assert_eq!(AccessToken::new(""), Err(DomainError::EmptyToken));
    }

    #[test]
    fn test_bearer_header() {
        let token = AccessToken::new("abc123").unwrap();
        assert_eq!(token.bearer_header(), "Bearer abc123");
        assert_eq!(token.expose(), "abc123");
    }

    #[test]
    fn test_preview_hides_short_tokens() {
        let token = AccessToken::new("short").unwrap();
        assert_eq!(token.preview(), "***");

        let token = AccessToken::new("abcdefghijklmnop").unwrap();
        assert_eq!(token.preview(), "abcdefgh...");
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = AccessToken::new("abcdefghijklmnop").unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("ijklmnop"));
    }
}
