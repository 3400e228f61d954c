//! Fare rule ingestion and least-cost itinerary pricing.
//!
//! Fare products and their rules are ingested once into an immutable
//! [`FareSnapshot`]. Pricing then answers: "what is the cheapest way to pay
//! for these rides?" by splitting the itinerary into groups of rides, each
//! covered by one fare product.

mod builder;
mod config;
mod product;
pub(crate) mod rule_set;
mod search;
mod service;
mod snapshot;

pub use builder::{FareTableBuilder, IngestError, IngestReport, ingest};
pub use config::{FareConfig, SelectionPolicy};
pub use product::{FareProduct, TransferPolicy};
pub use rule_set::{FareRuleSet, RideGroup};
pub use search::{FarePricer, FareQuote, PricedGroup, PricingError};
pub use service::FareService;
pub use snapshot::{FareEntry, FareSnapshot};
