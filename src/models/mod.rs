//! Data models for the account profile, idea drafts and journal records.

mod account;
mod idea;
pub mod numeric;

pub use account::AccountProfile;
pub use idea::{IdeaDraft, IdeaRecord, NewsGuard};
