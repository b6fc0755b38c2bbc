//! Client settings domain model
//!
//! Defines how the session client reaches the API and how it recognizes the
//! two authentication signals in a 401 payload.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Settings for the session client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the remote API.
    pub base_url: String,
    /// Path of the renewal endpoint, relative to `base_url`.
    pub refresh_path: String,
    /// Re-authentication entry point handed to the navigator on termination.
    pub login_path: String,
    /// Default per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User-Agent sent with every call.
    pub user_agent: String,
    /// Recognition rules for authentication failures.
    pub auth_signals: AuthSignalSettings,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            login_path: "/login".to_string(),
            timeout_ms: 30_000,
            user_agent: concat!("Tether/", env!("CARGO_PKG_VERSION")).to_string(),
            auth_signals: AuthSignalSettings::default(),
        }
    }
}

impl ClientSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSetting` for the first invalid field.
    pub fn validate(&self) -> DomainResult<()> {
        let base = self.base()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(DomainError::invalid_setting(
                "base_url",
                format!("unsupported scheme `{}`", base.scheme()),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(DomainError::invalid_setting(
                "timeout_ms",
                "must be greater than zero",
            ));
        }
        self.auth_signals.validate()
    }

    /// Resolves a path (or absolute URL) against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> DomainResult<String> {
        let base = self.base()?;
        base.join(path)
            .map(String::from)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {path}")))
    }

    /// Full URL of the renewal endpoint.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if it cannot be resolved.
    pub fn refresh_url(&self) -> DomainResult<String> {
        self.endpoint(&self.refresh_path)
    }

    fn base(&self) -> DomainResult<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| DomainError::invalid_setting("base_url", e.to_string()))
    }
}

/// How authentication failures are recognized in a response.
///
/// Only responses with `status` are inspected; the JSON field `code_field` of
/// the payload is compared with the configured codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSignalSettings {
    /// Status code that carries auth signals.
    pub status: u16,
    /// Name of the payload field holding the signal code.
    pub code_field: String,
    /// Code meaning "access token expired" (recoverable).
    pub access_token_expired: String,
    /// Codes meaning "refresh credential expired or invalid" (terminal).
    pub refresh_token_expired: Vec<String>,
}

impl Default for AuthSignalSettings {
    fn default() -> Self {
        Self {
            status: 401,
            code_field: "code".to_string(),
            access_token_expired: "ACCESS_TOKEN_EXPIRED".to_string(),
            refresh_token_expired: vec![
                "REFRESH_TOKEN_EXPIRED".to_string(),
                "REFRESH_TOKEN_INVALID".to_string(),
            ],
        }
    }
}

impl AuthSignalSettings {
    fn validate(&self) -> DomainResult<()> {
        if self.access_token_expired.trim().is_empty() {
            return Err(DomainError::invalid_setting(
                "auth_signals.access_token_expired",
                "must not be empty",
            ));
        }
        if self.code_field.trim().is_empty() {
            return Err(DomainError::invalid_setting(
                "auth_signals.code_field",
                "must not be empty",
            ));
        }
        if self
            .refresh_token_expired
            .iter()
            .any(|code| code == &self.access_token_expired)
        {
            return Err(DomainError::invalid_setting(
                "auth_signals.refresh_token_expired",
                "must not contain the access-token-expired code",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ClientSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.auth_signals.status, 401);
        assert_eq!(
            settings.refresh_url().unwrap(),
            "http://localhost:8080/auth/refresh"
        );
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let settings = ClientSettings {
            base_url: "https://api.example.com/v1/".to_string(),
            ..ClientSettings::default()
        };
        assert_eq!(
            settings.endpoint("repos").unwrap(),
            "https://api.example.com/v1/repos"
        );
        assert_eq!(
            settings.endpoint("/auth/refresh").unwrap(),
            "https://api.example.com/auth/refresh"
        );
    }

    #[test]
    fn test_validation_errors() {
        let bad_scheme = ClientSettings {
            base_url: "ftp://example.com".to_string(),
            ..ClientSettings::default()
        };
        assert!(matches!(
            bad_scheme.validate(),
            Err(DomainError::InvalidSetting { field, .. }) if field == "base_url"
        ));

        let zero_timeout = ClientSettings {
            timeout_ms: 0,
            ..ClientSettings::default()
        };
        assert!(zero_timeout.validate().is_err());

        let mut overlapping = ClientSettings::default();
        overlapping
            .auth_signals
            .refresh_token_expired
            .push("ACCESS_TOKEN_EXPIRED".to_string());
        assert!(overlapping.validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let json = r#"{"base_url":"https://api.example.com","auth_signals":{"code_field":"error"}}"#;
        let settings: ClientSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.refresh_path, "/auth/refresh");
        assert_eq!(settings.auth_signals.code_field, "error");
        assert_eq!(settings.auth_signals.status, 401);
    }
}
