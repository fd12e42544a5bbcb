//! Idea journal: committing, removing, clearing and filtering ideas.

mod error;
mod store;

pub use error::JournalError;
pub use store::{Confirmation, JournalFilter, JournalStore};
