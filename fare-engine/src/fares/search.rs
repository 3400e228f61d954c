//! Least-cost fare combination search.
//!
//! Splits an itinerary into contiguous groups of rides and picks one fare
//! product per group so that the total price is minimal. Dynamic
//! programming over ride boundaries: `best[i]` is the cheapest way to pay
//! for the first `i` rides, and
//!
//! ```text
//! best[i] = min over j < i of best[j] + group_cost(rides[j..i])
//! ```
//!
//! where a group no product covers costs infinity. O(n²) group evaluations.

use std::ops::Range;

use tracing::{debug, trace};

use crate::domain::{CurrencyCode, FareId, Price, Ride};

use super::config::{FareConfig, SelectionPolicy};
use super::rule_set::RideGroup;
use super::snapshot::{FareEntry, FareSnapshot};

/// Error from itinerary pricing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// Nothing to price
    #[error("itinerary must have at least one ride")]
    EmptyItinerary,

    /// Itinerary exceeds the configured ride limit
    #[error("itinerary has {rides} rides, more than the limit of {limit}")]
    ItineraryTooLong { rides: usize, limit: usize },

    /// No partition of the rides can be fully priced
    #[error("no fare available for itinerary")]
    NoFareAvailable,

    /// The cheapest partition mixes currencies; the feed is inconsistent
    #[error("fare currency mismatch: {expected} and {found} in one itinerary")]
    CurrencyMismatch {
        expected: CurrencyCode,
        found: CurrencyCode,
    },

    /// Sum of fares is not representable
    #[error("fare total overflowed")]
    Overflow,
}

/// One group of the chosen partition and the product paying for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedGroup {
    /// Indices of the rides covered, into the priced ride slice.
    pub rides: Range<usize>,
    pub fare_id: FareId,
    pub price: Price,
    pub currency: CurrencyCode,
}

/// Result of pricing an itinerary.
///
/// Only `total` and `currency` are meaningful to callers; when several
/// partitions cost the same, which one `groups` shows is unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareQuote {
    pub total: Price,
    pub currency: CurrencyCode,
    pub groups: Vec<PricedGroup>,
}

/// Prices itineraries against one fare snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FarePricer<'a> {
    snapshot: &'a FareSnapshot,
    config: &'a FareConfig,
}

impl<'a> FarePricer<'a> {
    pub fn new(snapshot: &'a FareSnapshot, config: &'a FareConfig) -> Self {
        Self { snapshot, config }
    }

    /// The product in `currency` chosen for a group, or `None` if no
    /// product in that currency applies.
    ///
    /// Candidates are scanned in fare id order and only replaced by a
    /// strictly better one, so the choice is deterministic. Prices are only
    /// ever compared within one currency.
    pub fn group_fare(
        &self,
        group: &RideGroup<'_>,
        currency: CurrencyCode,
    ) -> Option<&'a FareEntry> {
        let enforce = self.config.enforce_transfer_policy;
        let mut chosen: Option<&'a FareEntry> = None;

        for entry in self.snapshot.candidates(group) {
            if entry.product.currency != currency || !entry.applies_to(group, enforce) {
                continue;
            }
            trace!(fare_id = %entry.product.id, rides = group.rides().len(), "fare matches group");
            if chosen.is_none_or(|current| self.prefer(entry, current)) {
                chosen = Some(entry);
            }
        }

        chosen
    }

    /// Whether `candidate` should replace `current` under the selection policy.
    fn prefer(&self, candidate: &FareEntry, current: &FareEntry) -> bool {
        let by_price = candidate.product.price < current.product.price;
        match self.config.selection {
            SelectionPolicy::Cheapest => by_price,
            SelectionPolicy::MostSpecific => {
                let a = candidate.rules.specificity();
                let b = current.rules.specificity();
                a > b || (a == b && by_price)
            }
        }
    }

    /// Price an itinerary with the cheapest covering combination of fares.
    ///
    /// The search runs once per currency in the snapshot. Exactly one
    /// currency must be able to cover the whole itinerary.
    ///
    /// # Errors
    ///
    /// - `EmptyItinerary` / `ItineraryTooLong` for out-of-range input
    /// - `NoFareAvailable` if no grouping of the rides can be covered at all
    /// - `CurrencyMismatch` if more than one currency covers the itinerary,
    ///   or if it can only be covered by mixing currencies
    pub fn price(&self, rides: &[Ride]) -> Result<FareQuote, PricingError> {
        let n = rides.len();
        if n == 0 {
            return Err(PricingError::EmptyItinerary);
        }
        if n > self.config.max_rides {
            return Err(PricingError::ItineraryTooLong {
                rides: n,
                limit: self.config.max_rides,
            });
        }

        debug!(rides = n, products = self.snapshot.len(), "pricing itinerary");

        let mut quotes = Vec::new();
        for currency in self.snapshot.currencies() {
            if let Some(quote) = self.price_in(rides, currency)? {
                quotes.push(quote);
            }
        }

        let mut quotes = quotes.into_iter();
        match (quotes.next(), quotes.next()) {
            (Some(quote), None) => {
                debug!(
                    total = %quote.total,
                    currency = %quote.currency,
                    groups = quote.groups.len(),
                    "itinerary priced"
                );
                Ok(quote)
            }
            (Some(first), Some(second)) => {
                debug!(rides = n, "itinerary covered in several currencies");
                Err(PricingError::CurrencyMismatch {
                    expected: first.currency,
                    found: second.currency,
                })
            }
            (None, _) => Err(self.uncovered(rides)),
        }
    }

    /// Cheapest covering using only products in `currency`, if any.
    fn price_in(
        &self,
        rides: &[Ride],
        currency: CurrencyCode,
    ) -> Result<Option<FareQuote>, PricingError> {
        let n = rides.len();
        // cost[i]: cheapest price for rides[..i]; None is infinity
        let mut cost: Vec<Option<Price>> = vec![None; n + 1];
        // back[i]: start of the last group and its product in that optimum
        let mut back: Vec<Option<(usize, &'a FareEntry)>> = vec![None; n + 1];
        cost[0] = Some(Price::ZERO);

        for end in 1..=n {
            for start in 0..end {
                let Some(prefix) = cost[start] else {
                    continue;
                };
                let Some(group) = RideGroup::new(&rides[start..end]) else {
                    continue;
                };
                let Some(entry) = self.group_fare(&group, currency) else {
                    continue;
                };

                let total = prefix
                    .checked_add(entry.product.price)
                    .ok_or(PricingError::Overflow)?;
                // Strict comparison keeps the earliest boundary on ties
                if cost[end].is_none_or(|best| total < best) {
                    cost[end] = Some(total);
                    back[end] = Some((start, entry));
                }
            }
        }

        let Some(total) = cost[n] else {
            trace!(%currency, "currency does not cover itinerary");
            return Ok(None);
        };

        Ok(Some(FareQuote {
            total,
            currency,
            groups: reconstruct(&back)?,
        }))
    }

    /// Error for an itinerary no single currency covers.
    ///
    /// Looks for any covering at all, ignoring price: if one exists it
    /// must mix currencies, otherwise there is no fare.
    fn uncovered(&self, rides: &[Ride]) -> PricingError {
        let n = rides.len();
        let enforce = self.config.enforce_transfer_policy;
        // reach[i]: last group (start, currency) of some covering of rides[..i]
        let mut reach: Vec<Option<(usize, CurrencyCode)>> = vec![None; n + 1];

        for end in 1..=n {
            for start in 0..end {
                if start > 0 && reach[start].is_none() {
                    continue;
                }
                let Some(group) = RideGroup::new(&rides[start..end]) else {
                    continue;
                };
                let matching = self
                    .snapshot
                    .candidates(&group)
                    .into_iter()
                    .find(|entry| entry.applies_to(&group, enforce));
                if let Some(entry) = matching {
                    reach[end] = Some((start, entry.product.currency));
                    break;
                }
            }
        }

        let mut currencies = Vec::new();
        let mut end = n;
        while end > 0 {
            let Some((start, currency)) = reach[end] else {
                debug!(rides = n, "no fare available");
                return PricingError::NoFareAvailable;
            };
            currencies.push(currency);
            end = start;
        }
        currencies.reverse();

        match currencies.split_first() {
            Some((&expected, rest)) => match rest.iter().find(|&&c| c != expected) {
                Some(&found) => {
                    debug!(%expected, %found, "itinerary only covered by mixing currencies");
                    PricingError::CurrencyMismatch { expected, found }
                }
                None => PricingError::NoFareAvailable,
            },
            None => PricingError::NoFareAvailable,
        }
    }
}

/// Walk the back pointers from the end to recover the chosen partition.
fn reconstruct(back: &[Option<(usize, &FareEntry)>]) -> Result<Vec<PricedGroup>, PricingError> {
    let mut groups = Vec::new();
    let mut end = back.len() - 1;

    while end > 0 {
        let (start, entry) = back[end].ok_or(PricingError::NoFareAvailable)?;
        groups.push(PricedGroup {
            rides: start..end,
            fare_id: entry.product.id.clone(),
            price: entry.product.price,
            currency: entry.product.currency,
        });
        end = start;
    }

    groups.reverse();
    Ok(groups)
}
