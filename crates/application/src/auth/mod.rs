//! Session authentication core.
//!
//! This module provides:
//! - In-memory access token storage
//! - The immutable pending-call value replayed after renewal
//! - The single-flight refresh coordinator
//! - The session terminator

mod coordinator;
mod pending_call;
mod terminator;
mod token_store;

pub use coordinator::{RefreshCoordinator, Replayer};
pub use pending_call::PendingCall;
pub use terminator::SessionTerminator;
pub use token_store::TokenStore;
