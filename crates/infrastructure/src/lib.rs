//! Tether Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading and the
//! wiring that assembles a ready-to-use session.

pub mod adapters;
pub mod auth;
pub mod settings;
pub mod session;

pub use adapters::{
    MemoryArtifacts, ReqwestHttpClient, SystemClock, WatchNavigator, build_client,
};
pub use auth::HttpTokenRenewer;
pub use settings::{ENV_PREFIX, SettingsError, load_settings};
pub use session::{Session, connect};
