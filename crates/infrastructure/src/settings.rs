//! Settings loading.
//!
//! Settings come from an optional file (format picked from its extension)
//! overlaid with `TETHER_`-prefixed environment variables. Nested keys use a
//! double underscore: `TETHER_AUTH_SIGNALS__STATUS=419`. The list of
//! refresh-expired codes is comma separated.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use tether_application::HttpClientError;
use tether_domain::{ClientSettings, DomainError};
use thiserror::Error;
use tracing::debug;

/// Prefix of the environment variables read by [`load_settings`].
pub const ENV_PREFIX: &str = "TETHER";

/// Errors raised while loading settings or assembling a session.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] ConfigError),

    /// The loaded settings are invalid.
    #[error("invalid settings: {0}")]
    Invalid(#[from] DomainError),

    /// The HTTP client could not be built from the settings.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] HttpClientError),
}

/// Loads settings from `path` (if given) and the process environment.
///
/// # Errors
///
/// Returns `SettingsError::Load` if the file is missing or unreadable, and
/// `SettingsError::Invalid` if the result fails validation.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    load_with(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("auth_signals.refresh_token_expired")
        .try_parsing(true)
}

fn load_with(path: Option<&Path>, env: Environment) -> Result<ClientSettings, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        debug!(path = %path.display(), "reading settings file");
        builder = builder.add_source(File::from(path).required(true));
    }
    let settings: ClientSettings = builder.add_source(env).build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
