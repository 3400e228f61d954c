//! Upstream data boundary: typed fare records and JSON documents.
//!
//! Raw tabular rows become [`FareAttributeRecord`]s and [`FareRuleRecord`]s
//! here; the fare engine itself only ever sees typed, validated records.

mod error;
mod loader;
mod records;

pub use error::FeedError;
pub use loader::{FeedDocument, Itinerary, load_feed, load_itinerary};
pub use records::{FareAttributeRecord, FareRuleRecord};
