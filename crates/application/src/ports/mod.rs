//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod cache_storage;
mod draft_store;
mod error_reporter;
mod network_port;
mod prompt_queue;

pub use cache_storage::CacheStoragePort;
#[cfg(test)]
pub use cache_storage::MockCacheStoragePort;
pub use draft_store::DraftStorePort;
#[cfg(test)]
pub use draft_store::MockDraftStorePort;
pub use error_reporter::ErrorReporterPort;
#[cfg(test)]
pub use error_reporter::MockErrorReporterPort;
#[cfg(test)]
pub use network_port::MockNetworkPort;
pub use network_port::NetworkPort;
#[cfg(test)]
pub use prompt_queue::MockPromptQueuePort;
pub use prompt_queue::PromptQueuePort;
