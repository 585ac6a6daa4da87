//! Value Objects - Immutable, identity-less domain primitives

mod cache_generation;
mod draft_id;
mod request_method;

pub use cache_generation::CacheGeneration;
pub use draft_id::DraftId;
pub use request_method::RequestMethod;
