pub mod client;
pub mod filter;
pub mod model;
pub mod search;

pub use client::{OrganicResult, SerperClient};
pub use filter::{FilterOutcome, filter_by_location, filter_by_subject, main_subject};
pub use model::{ADDRESS_FALLBACK, Place, RawPlace};
pub use search::{MissingApiKey, PlaceSource, SerperPlaceSource, dedup_places, split_query};
