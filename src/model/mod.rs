//! Data model shared by the crawler and the output writer
//!
//! - `FilterPair`: a (location, subject) combination that scopes one crawl phase
//! - `TutorRecord`: the structured result of one profile page

mod filter;
mod record;

pub use filter::{capitalize_first, filter_pairs, FilterPair};
pub use record::{TutorRecord, NOT_AVAILABLE};
