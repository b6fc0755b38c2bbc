//! Tether Application - Session coordination and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for transport, renewal, navigation)
//! - The token store, refresh coordinator and session terminator
//! - The request dispatcher every outbound call goes through

pub mod auth;
pub mod dispatcher;
pub mod error;
pub mod ports;

pub use auth::{PendingCall, RefreshCoordinator, Replayer, SessionTerminator, TokenStore};
pub use dispatcher::{Outcome, RequestDispatcher, SignalClassifier};
pub use error::{CallError, CallResult};
pub use ports::{
    Clock, HttpClient, HttpClientError, Navigator, RenewalError, SessionArtifacts, TokenRenewer,
};
