//! Domain entities - Objects with identity and lifecycle

mod autosave_state;
mod draft;
mod queued_prompt;
mod resource;
mod worker_state;

pub use autosave_state::{AutosaveState, AutosaveStatus};
pub use draft::{Draft, DraftOptions, NewDraft, datetime_from_millis, is_blank};
pub use queued_prompt::QueuedPrompt;
pub use resource::{ResourceRequest, ResourceResponse};
pub use worker_state::WorkerState;
