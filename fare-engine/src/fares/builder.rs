//! Fare rule ingestion.
//!
//! Turns typed fare-attribute and fare-rule records into a
//! [`FareSnapshot`]. Products must be added before the rules that refer to
//! them; a rule for an unknown product is reported and skipped, never
//! fatal, so a partially broken feed still yields a usable table.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::domain::FareId;
use crate::feed::{FareAttributeRecord, FareRuleRecord};

use super::snapshot::{FareEntry, FareSnapshot};

/// Recoverable problem found while ingesting fare records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// A fare rule names a fare id with no fare attribute record
    #[error("fare rule references unknown fare id {fare_id}")]
    UnknownFare { fare_id: FareId },
}

/// Mutable accumulator for fare products and their rule sets.
///
/// # Example
///
/// ```
/// use fare_engine::domain::{CurrencyCode, FareId, Price, ZoneId};
/// use fare_engine::fares::FareTableBuilder;
/// use fare_engine::feed::{FareAttributeRecord, FareRuleRecord};
///
/// let mut builder = FareTableBuilder::new();
/// builder.add_product(FareAttributeRecord::new(
///     FareId::new("F1").unwrap(),
///     Price::parse("2.00").unwrap(),
///     CurrencyCode::parse("USD").unwrap(),
/// ));
///
/// let mut rule = FareRuleRecord::new(FareId::new("F1").unwrap());
/// rule.contains_id = Some(ZoneId::new("1").unwrap());
/// builder.add_rule(rule).unwrap();
///
/// // Rules for unknown products are rejected without touching the table
/// assert!(builder.add_rule(FareRuleRecord::new(FareId::new("X99").unwrap())).is_err());
///
/// let snapshot = builder.build();
/// assert_eq!(snapshot.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FareTableBuilder {
    entries: BTreeMap<FareId, FareEntry>,
    rules_applied: usize,
}

impl FareTableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fare product with an empty rule set.
    ///
    /// Re-adding an id already present is a no-op: the first record wins.
    /// Returns whether the product was inserted.
    pub fn add_product(&mut self, record: FareAttributeRecord) -> bool {
        if self.entries.contains_key(&record.fare_id) {
            debug!(fare_id = %record.fare_id, "duplicate fare attribute ignored");
            return false;
        }
        let product = record.into_product();
        self.entries
            .insert(product.id.clone(), FareEntry::new(product));
        true
    }

    /// Apply a fare rule to its product's rule set.
    ///
    /// Every present field is added to its own dimension; a record may
    /// populate several at once.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::UnknownFare` if no product with the rule's
    /// fare id has been added. The builder is left unchanged.
    pub fn add_rule(&mut self, record: FareRuleRecord) -> Result<(), IngestError> {
        let Some(entry) = self.entries.get_mut(&record.fare_id) else {
            warn!(fare_id = %record.fare_id, "fare rule references unknown fare id, skipping");
            return Err(IngestError::UnknownFare {
                fare_id: record.fare_id,
            });
        };

        let rules = &mut entry.rules;
        if let Some(zone) = record.contains_id {
            rules.add_contains(zone);
        }
        if record.origin_id.is_some() || record.destination_id.is_some() {
            rules.add_origin_destination(record.origin_id, record.destination_id);
        }
        if let Some(route) = record.route_id {
            rules.add_route(route);
        }

        self.rules_applied += 1;
        Ok(())
    }

    /// Number of products added so far.
    pub fn product_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of rules successfully applied so far.
    pub fn rules_applied(&self) -> usize {
        self.rules_applied
    }

    /// Freeze the table.
    pub fn build(self) -> FareSnapshot {
        FareSnapshot::from_entries(self.entries)
    }
}

/// Outcome of a full ingestion: the frozen table and every skipped record.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub snapshot: FareSnapshot,
    pub errors: Vec<IngestError>,
    pub rules_applied: usize,
}

impl IngestReport {
    /// Returns true if no record was skipped.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// One-line description for operators.
    pub fn summary(&self) -> String {
        format!(
            "{} fare products, {} rules applied, {} rules skipped",
            self.snapshot.len(),
            self.rules_applied,
            self.errors.len()
        )
    }
}

/// Ingest all products, then all rules.
///
/// Never fails: rule errors are collected into the report.
pub fn ingest<P, R>(products: P, rules: R) -> IngestReport
where
    P: IntoIterator<Item = FareAttributeRecord>,
    R: IntoIterator<Item = FareRuleRecord>,
{
    let mut builder = FareTableBuilder::new();
    for record in products {
        builder.add_product(record);
    }

    let errors: Vec<IngestError> = rules
        .into_iter()
        .filter_map(|record| builder.add_rule(record).err())
        .collect();

    let rules_applied = builder.rules_applied();
    let report = IngestReport {
        snapshot: builder.build(),
        errors,
        rules_applied,
    };
    info!("{}", report.summary());
    report
}
