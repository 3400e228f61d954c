//! Fare products (GTFS fare attributes).

use chrono::Duration;

use crate::domain::{AgencyId, CurrencyCode, FareId, Price};

/// How far a single purchase of a fare product stretches.
///
/// `None` in either field means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferPolicy {
    /// Number of transfers permitted (GTFS `transfers`).
    pub max_transfers: Option<u32>,

    /// Time from first boarding within which later boardings are covered
    /// (GTFS `transfer_duration`).
    pub duration: Option<Duration>,
}

impl TransferPolicy {
    /// A policy with no limits.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Whether a group with `transfers` transfers, whose last boarding is
    /// `span` after its first, is covered by one purchase.
    pub fn permits(&self, transfers: usize, span: Duration) -> bool {
        let count_ok = self
            .max_transfers
            .is_none_or(|max| transfers <= max as usize);
        let span_ok = self.duration.is_none_or(|limit| span <= limit);
        count_ok && span_ok
    }
}

/// A fare product: a price in a currency, optionally scoped to an agency.
///
/// Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareProduct {
    pub id: FareId,
    pub price: Price,
    pub currency: CurrencyCode,

    /// Agency the product belongs to. `None` applies to every agency.
    pub agency: Option<AgencyId>,

    pub transfers: TransferPolicy,
}

impl FareProduct {
    /// Create a product with no agency scope and unlimited transfers.
    pub fn new(id: FareId, price: Price, currency: CurrencyCode) -> Self {
        Self {
            id,
            price,
            currency,
            agency: None,
            transfers: TransferPolicy::unlimited(),
        }
    }

    /// Scope the product to one agency.
    pub fn with_agency(mut self, agency: AgencyId) -> Self {
        self.agency = Some(agency);
        self
    }

    pub fn with_transfers(mut self, transfers: TransferPolicy) -> Self {
        self.transfers = transfers;
        self
    }
}
