//! Port adapters.

mod memory_artifacts;
mod reqwest_client;
mod system_clock;
mod watch_navigator;

pub use memory_artifacts::MemoryArtifacts;
pub use reqwest_client::{ReqwestHttpClient, build_client};
pub use system_clock::SystemClock;
pub use watch_navigator::WatchNavigator;
