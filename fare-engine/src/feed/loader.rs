//! JSON documents for fare tables and itineraries.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Ride};
use crate::fares::{IngestReport, ingest};

use super::error::FeedError;
use super::records::{FareAttributeRecord, FareRuleRecord};

/// The fare part of a feed: every fare attribute and fare rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub fare_attributes: Vec<FareAttributeRecord>,
    #[serde(default)]
    pub fare_rules: Vec<FareRuleRecord>,
}

impl FeedDocument {
    /// Build the fare snapshot: products first, then rules.
    pub fn ingest(self) -> IngestReport {
        ingest(self.fare_attributes, self.fare_rules)
    }
}

/// An ordered, non-empty sequence of rides to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawItinerary")]
pub struct Itinerary {
    rides: Vec<Ride>,
}

#[derive(Deserialize)]
struct RawItinerary {
    rides: Vec<Ride>,
}

impl TryFrom<RawItinerary> for Itinerary {
    type Error = DomainError;

    fn try_from(raw: RawItinerary) -> Result<Self, Self::Error> {
        Itinerary::new(raw.rides)
    }
}

impl Itinerary {
    /// Returns `DomainError::EmptyItinerary` if there are no rides.
    pub fn new(rides: Vec<Ride>) -> Result<Self, DomainError> {
        if rides.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }
        Ok(Self { rides })
    }

    pub fn rides(&self) -> &[Ride] {
        &self.rides
    }
}

/// Load a fare feed document from a JSON file.
pub fn load_feed(path: impl AsRef<Path>) -> Result<FeedDocument, FeedError> {
    load_json(path.as_ref())
}

/// Load an itinerary from a JSON file.
pub fn load_itinerary(path: impl AsRef<Path>) -> Result<Itinerary, FeedError> {
    load_json(path.as_ref())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, FeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| FeedError::Json {
        path: path.to_path_buf(),
        source,
    })
}
