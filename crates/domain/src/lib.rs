//! Tether Domain - Core session types
//!
//! This crate defines the domain model for the Tether session layer.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod settings;
pub mod token;

pub use error::{DomainError, DomainResult};
pub use request::{Header, Headers, HttpMethod, RequestSpec};
pub use response::ResponseSpec;
pub use session::{CoordinatorState, NavigationRequest, SessionEndReason};
pub use settings::{AuthSignalSettings, ClientSettings};
pub use token::AccessToken;
