//! Application layer - Use cases and orchestration
//!
//! Defines the ports the core depends on and the two services built on
//! them: the autosave service that keeps drafts recoverable and the offline
//! cache service that serves the application shell without a network.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
