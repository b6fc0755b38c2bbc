//! Session wiring.
//!
//! Assembles the production adapters around the session core: one shared
//! cookie-store reqwest client for outbound calls and renewal, a watch-channel
//! navigator for the shell, and an in-memory artifact store.

use std::sync::Arc;

use tether_application::{
    RefreshCoordinator, RequestDispatcher, SessionTerminator, SignalClassifier, TokenStore,
};
use tether_domain::{ClientSettings, HttpMethod, NavigationRequest, RequestSpec};
use tokio::sync::watch;
use tracing::info;

use crate::adapters::{
    MemoryArtifacts, ReqwestHttpClient, SystemClock, WatchNavigator, build_client,
};
use crate::auth::HttpTokenRenewer;
use crate::settings::SettingsError;

/// A connected session: the dispatcher plus the handles the shell needs.
#[derive(Debug, Clone)]
pub struct Session {
    settings: ClientSettings,
    dispatcher: RequestDispatcher,
    navigator: Arc<WatchNavigator>,
    artifacts: Arc<MemoryArtifacts>,
}

/// Builds a session from validated settings. No network traffic happens
/// until the first call.
///
/// # Errors
///
/// Returns `SettingsError` if the settings are invalid or the HTTP client
/// cannot be built.
pub fn connect(settings: ClientSettings) -> Result<Session, SettingsError> {
    settings.validate()?;

    let client = build_client(&settings)?;
    let renewer = HttpTokenRenewer::from_settings(client.clone(), &settings)?;
    let http = ReqwestHttpClient::with_client(client, settings.timeout_ms);

    let navigator = Arc::new(WatchNavigator::new());
    let artifacts = Arc::new(MemoryArtifacts::new("session-cache"));
    let terminator = SessionTerminator::new(
        TokenStore::new(),
        navigator.clone(),
        Arc::new(SystemClock::new()),
        settings.login_path.clone(),
    )
    .with_artifacts(artifacts.clone());

    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::new(renewer),
        Arc::new(terminator),
    ));
    let dispatcher = RequestDispatcher::new(
        Arc::new(http),
        coordinator,
        SignalClassifier::new(settings.auth_signals.clone()),
    );

    info!(base_url = %settings.base_url, "session client ready");

    Ok(Session {
        settings,
        dispatcher,
        navigator,
        artifacts,
    })
}

impl Session {
    /// The dispatcher every outbound call goes through.
    #[must_use]
    pub const fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// The settings this session was built from.
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Session-scoped cache, cleared on termination.
    #[must_use]
    pub const fn artifacts(&self) -> &Arc<MemoryArtifacts> {
        &self.artifacts
    }

    /// Subscribes to navigation requests issued on termination.
    #[must_use]
    pub fn navigation(&self) -> watch::Receiver<Option<NavigationRequest>> {
        self.navigator.subscribe()
    }

    /// The last navigation request, if the session has been terminated.
    #[must_use]
    pub fn last_navigation(&self) -> Option<NavigationRequest> {
        self.navigator.latest()
    }

    /// Builds a request for `path`, resolved against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` if the URL cannot be resolved.
    pub fn request(&self, method: HttpMethod, path: &str) -> Result<RequestSpec, SettingsError> {
        Ok(RequestSpec::new(method, self.settings.endpoint(path)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_connect_rejects_invalid_settings() {
        let settings = ClientSettings {
            base_url: "not a url".to_string(),
            ..ClientSettings::default()
        };
        assert!(matches!(
            connect(settings),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_request_resolves_against_base_url() {
        let settings = ClientSettings {
            base_url: "https://api.example.com".to_string(),
            ..ClientSettings::default()
        };
        let session = connect(settings).unwrap();

        let request = session.request(HttpMethod::Get, "/repos?page=2").unwrap();
        assert_eq!(request.url, "https://api.example.com/repos?page=2");
        assert!(!session.dispatcher().tokens().is_present());
        assert_eq!(session.last_navigation(), None);
    }
}
