//! Test doubles for the session ports.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use tether_application::{
    Clock, HttpClient, HttpClientError, Navigator, RefreshCoordinator, RenewalError,
    RequestDispatcher, SessionTerminator, SignalClassifier, TokenRenewer, TokenStore,
};
use tether_domain::{AccessToken, NavigationRequest, RequestSpec, ResponseSpec};
use tokio::sync::Semaphore;

pub const BASE: &str = "https://api.example.com";

pub fn token(value: &str) -> AccessToken {
    AccessToken::new(value).unwrap()
}

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

pub fn expired_access() -> ResponseSpec {
    ResponseSpec::new(401, r#"{"code":"ACCESS_TOKEN_EXPIRED"}"#)
}

pub fn expired_refresh() -> ResponseSpec {
    ResponseSpec::new(401, r#"{"code":"REFRESH_TOKEN_EXPIRED"}"#)
}

/// What the fake API does for a path, given the bearer token it received.
#[derive(Clone)]
pub enum Route {
    /// 200 with the path as body if the token is the accepted one, else access-expired.
    Guarded,
    /// 200 with the accepted token, otherwise the given response.
    GuardedThen(ResponseSpec),
    /// Always this response.
    Fixed(ResponseSpec),
    /// Always this transport error.
    Broken(HttpClientError),
    /// Like `Guarded`, but each request waits for a permit first.
    Held(Arc<Semaphore>),
}

/// One request as seen by the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub url: String,
    pub authorization: Option<String>,
}

/// In-memory API that accepts exactly one bearer token at a time.
#[derive(Default)]
pub struct FakeApi {
    accepted: Mutex<Option<String>>,
    routes: Mutex<HashMap<String, Route>>,
    seen: Mutex<Vec<Seen>>,
}

impl FakeApi {
    pub fn accept(&self, token: &str) {
        *self.accepted.lock() = Some(format!("Bearer {token}"));
    }

    pub fn route(&self, path: &str, route: Route) {
        self.routes.lock().insert(url(path), route);
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }

    pub fn seen_for(&self, path: &str) -> Vec<Option<String>> {
        let target = url(path);
        self.seen()
            .into_iter()
            .filter(|s| s.url == target)
            .map(|s| s.authorization)
            .collect()
    }
}

#[async_trait]
impl HttpClient for FakeApi {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let authorization = request.headers.get("Authorization").map(String::from);
        self.seen.lock().push(Seen {
            url: request.url.clone(),
            authorization: authorization.clone(),
        });
        tokio::task::yield_now().await;

        let mut route = self
            .routes
            .lock()
            .get(&request.url)
            .cloned()
            .unwrap_or(Route::Guarded);
        if let Route::Held(gate) = route {
            gate.acquire().await.unwrap().forget();
            route = Route::Guarded;
        }
        let authorized = authorization.is_some() && *self.accepted.lock() == authorization;

        match route {
            Route::Guarded if authorized => Ok(ResponseSpec::new(200, request.url.clone())),
            Route::Guarded => Ok(expired_access()),
            Route::GuardedThen(_) if !authorized => Ok(expired_access()),
            Route::GuardedThen(response) | Route::Fixed(response) => Ok(response),
            Route::Broken(error) => Err(error),
            Route::Held(_) => unreachable!("held routes are released as guarded"),
        }
    }
}

/// Renewal endpoint that can be held closed until the test opens it.
pub struct GatedRenewer {
    calls: AtomicUsize,
    gate: Option<Semaphore>,
    result: Mutex<Result<AccessToken, RenewalError>>,
    api: Arc<FakeApi>,
}

impl GatedRenewer {
    /// Lets `n` pending (or future) renewals complete.
    pub fn open(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRenewer for GatedRenewer {
    async fn renew(&self) -> Result<AccessToken, RenewalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let result = self.result.lock().clone();
        if let Ok(token) = &result {
            self.api.accept(token.expose());
        }
        result
    }
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    requests: Mutex<Vec<NavigationRequest>>,
}

impl RecordingNavigator {
    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.requests.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, request: NavigationRequest) {
        self.requests.lock().push(request);
    }
}

/// A fully wired dispatcher over fakes.
pub struct Harness {
    pub api: Arc<FakeApi>,
    pub renewer: Arc<GatedRenewer>,
    pub navigator: Arc<RecordingNavigator>,
    pub dispatcher: RequestDispatcher,
}

impl Harness {
    /// Renewal answers `result`; `gated` holds every renewal until `open`.
    pub fn new(result: Result<&str, RenewalError>, gated: bool) -> Self {
        let api = Arc::new(FakeApi::default());
        let renewer = Arc::new(GatedRenewer {
            calls: AtomicUsize::new(0),
            gate: gated.then(|| Semaphore::new(0)),
            result: Mutex::new(result.map(token)),
            api: api.clone(),
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let terminator = Arc::new(SessionTerminator::new(
            TokenStore::new(),
            navigator.clone(),
            Arc::new(FixedClock),
            "/login",
        ));
        let coordinator = Arc::new(RefreshCoordinator::new(renewer.clone(), terminator));
        let dispatcher = RequestDispatcher::new(
            api.clone(),
            coordinator,
            SignalClassifier::default(),
        );
        Self {
            api,
            renewer,
            navigator,
            dispatcher,
        }
    }

    /// Signs in with `current`, which the API accepts.
    pub fn signed_in(self, current: &str) -> Self {
        self.api.accept(current);
        self.dispatcher.sign_in(token(current));
        self
    }

    /// Signs in with `stale`, which the API already considers expired.
    pub fn signed_in_expired(self, stale: &str) -> Self {
        self.dispatcher.sign_in(token(stale));
        self
    }

    pub fn spawn_get(
        &self,
        path: &str,
    ) -> tokio::task::JoinHandle<tether_application::CallResult<ResponseSpec>> {
        let dispatcher = self.dispatcher.clone();
        let request = RequestSpec::get(url(path));
        tokio::spawn(async move { dispatcher.send(request).await })
    }
}

/// Polls `condition` until it holds, failing the test after five seconds.
pub async fn eventually(what: &str, condition: impl Fn() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for: {what}");
}

/// Awaits `future`, failing the test after five seconds.
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("future did not settle in time")
}
