//! Typed fare records and their row adapters.
//!
//! Records mirror the GTFS `fare_attributes.txt` and `fare_rules.txt`
//! columns. `from_row` converts one string-keyed row (as produced by any
//! tabular reader) into a record; empty cells count as absent.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{AgencyId, CurrencyCode, FareId, Price, RouteId, ZoneId};
use crate::fares::{FareProduct, TransferPolicy};

use super::error::FeedError;

/// One row of `fare_attributes.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareAttributeRecord {
    pub fare_id: FareId,
    pub price: Price,
    pub currency_type: CurrencyCode,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub agency_id: Option<AgencyId>,
    /// Permitted transfers; `None` is unlimited.
    #[serde(default)]
    pub transfers: Option<u32>,
    /// Transfer window in seconds; `None` is unlimited.
    #[serde(default)]
    pub transfer_duration: Option<u64>,
}

impl FareAttributeRecord {
    /// A record with no agency and unlimited transfers.
    pub fn new(fare_id: FareId, price: Price, currency_type: CurrencyCode) -> Self {
        Self {
            fare_id,
            price,
            currency_type,
            agency_id: None,
            transfers: None,
            transfer_duration: None,
        }
    }

    /// Convert a string-keyed row using GTFS column names.
    pub fn from_row(row: &HashMap<String, String>) -> Result<Self, FeedError> {
        let fare_id = FareId::new(required(row, "fare_id")?)
            .map_err(|e| invalid("fare_id", e))?;
        let price = Price::parse(required(row, "price")?).map_err(|e| invalid("price", e))?;
        let currency_type = CurrencyCode::parse(required(row, "currency_type")?)
            .map_err(|e| invalid("currency_type", e))?;
        let agency_id = optional(row, "agency_id")
            .map(AgencyId::new)
            .transpose()
            .map_err(|e| invalid("agency_id", e))?;

        let transfers = match optional(row, "transfers") {
            None => None,
            Some(s @ ("0" | "1" | "2")) => s.parse().ok(),
            Some(_) => {
                return Err(FeedError::InvalidField {
                    field: "transfers",
                    message: "expected 0, 1, 2 or empty".into(),
                });
            }
        };

        let transfer_duration = optional(row, "transfer_duration")
            .map(str::parse::<u64>)
            .transpose()
            .map_err(|e| invalid("transfer_duration", e))?;

        Ok(Self {
            fare_id,
            price,
            currency_type,
            agency_id,
            transfers,
            transfer_duration,
        })
    }

    /// The fare product this record declares.
    pub fn into_product(self) -> FareProduct {
        let transfers = TransferPolicy {
            max_transfers: self.transfers,
            duration: self
                .transfer_duration
                .and_then(|secs| i64::try_from(secs).ok())
                .map(Duration::seconds),
        };
        let product = FareProduct::new(self.fare_id, self.price, self.currency_type)
            .with_transfers(transfers);
        match self.agency_id {
            Some(agency) => product.with_agency(agency),
            None => product,
        }
    }
}

/// One row of `fare_rules.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareRuleRecord {
    pub fare_id: FareId,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub route_id: Option<RouteId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub origin_id: Option<ZoneId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub destination_id: Option<ZoneId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contains_id: Option<ZoneId>,
}

impl FareRuleRecord {
    /// A rule for the given fare with no constraints set.
    pub fn new(fare_id: FareId) -> Self {
        Self {
            fare_id,
            route_id: None,
            origin_id: None,
            destination_id: None,
            contains_id: None,
        }
    }

    /// Convert a string-keyed row using GTFS column names.
    pub fn from_row(row: &HashMap<String, String>) -> Result<Self, FeedError> {
        let fare_id = FareId::new(required(row, "fare_id")?)
            .map_err(|e| invalid("fare_id", e))?;
        Ok(Self {
            fare_id,
            route_id: optional(row, "route_id")
                .map(RouteId::new)
                .transpose()
                .map_err(|e| invalid("route_id", e))?,
            origin_id: zone_column(row, "origin_id")?,
            destination_id: zone_column(row, "destination_id")?,
            contains_id: zone_column(row, "contains_id")?,
        })
    }
}

/// Trimmed cell contents, or `None` if the column is absent or blank.
fn optional<'a>(row: &'a HashMap<String, String>, field: &'static str) -> Option<&'a str> {
    row.get(field).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn required<'a>(
    row: &'a HashMap<String, String>,
    field: &'static str,
) -> Result<&'a str, FeedError> {
    optional(row, field).ok_or(FeedError::MissingField(field))
}

fn zone_column(
    row: &HashMap<String, String>,
    field: &'static str,
) -> Result<Option<ZoneId>, FeedError> {
    optional(row, field)
        .map(ZoneId::new)
        .transpose()
        .map_err(|e| invalid(field, e))
}

/// Deserialize an optional id, treating `null` and blank strings as absent
/// the same way [`optional`] treats empty cells.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<String>,
    T::Error: std::fmt::Display,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    T::try_from(trimmed.to_string())
        .map(Some)
        .map_err(<D::Error as serde::de::Error>::custom)
}

fn invalid(field: &'static str, error: impl std::fmt::Display) -> FeedError {
    FeedError::InvalidField {
        field,
        message: error.to_string(),
    }
}
