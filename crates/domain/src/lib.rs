//! Domain layer for Prompt Studio
//!
//! Contains the drafts, offline-cache resources and value objects shared by
//! the autosave and offline cache services. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
