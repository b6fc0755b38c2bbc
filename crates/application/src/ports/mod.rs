//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod clock;
mod http_client;
mod navigator;
mod session_artifacts;
mod token_renewer;

pub use clock::Clock;
pub use http_client::{HttpClient, HttpClientError};
pub use navigator::Navigator;
pub use session_artifacts::SessionArtifacts;
pub use token_renewer::{RenewalError, TokenRenewer};
