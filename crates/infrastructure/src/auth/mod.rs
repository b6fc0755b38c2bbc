//! Renewal endpoint adapter.

mod refresh_endpoint;

pub use refresh_endpoint::HttpTokenRenewer;
