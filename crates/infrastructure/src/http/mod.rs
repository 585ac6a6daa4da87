//! HTTP client adapters

mod network_client;

pub use network_client::{NetworkClientConfig, ReqwestNetworkAdapter, resolve_url};
