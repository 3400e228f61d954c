//! Shared fare service with snapshot reload.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::domain::Ride;

use super::builder::{IngestError, IngestReport};
use super::config::FareConfig;
use super::search::{FarePricer, FareQuote, PricingError};
use super::snapshot::FareSnapshot;

/// Thread-safe handle to the current fare snapshot.
///
/// Pricing calls take the snapshot current when they start and keep it for
/// their whole computation; [`reload`](Self::reload) swaps in a new one for
/// later calls. Cloning the handle shares the same snapshot slot.
#[derive(Debug, Clone)]
pub struct FareService {
    current: Arc<RwLock<Arc<FareSnapshot>>>,
    config: Arc<FareConfig>,
}

impl FareService {
    /// Create a service over an existing snapshot.
    pub fn new(snapshot: FareSnapshot, config: FareConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
            config: Arc::new(config),
        }
    }

    /// Create a service from an ingestion result.
    ///
    /// Skipped records were already logged while ingesting and are dropped.
    pub fn from_report(report: IngestReport, config: FareConfig) -> Self {
        Self::new(report.snapshot, config)
    }

    /// The snapshot pricing calls currently use.
    pub fn snapshot(&self) -> Arc<FareSnapshot> {
        // The slot only ever holds a complete Arc, so a poisoned lock is still consistent
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn config(&self) -> &FareConfig {
        &self.config
    }

    /// Price an itinerary against the current snapshot.
    pub fn price(&self, rides: &[Ride]) -> Result<FareQuote, PricingError> {
        let snapshot = self.snapshot();
        FarePricer::new(&snapshot, &self.config).price(rides)
    }

    /// Replace the snapshot with a freshly ingested one.
    ///
    /// Calls already in progress finish against the old snapshot. Returns
    /// the records skipped during ingestion.
    pub fn reload(&self, report: IngestReport) -> Vec<IngestError> {
        let count = report.snapshot.len();
        self.replace(report.snapshot);
        info!(products = count, "fare snapshot reloaded");
        report.errors
    }

    /// Swap in a snapshot.
    pub fn replace(&self, snapshot: FareSnapshot) {
        let fresh = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurrencyCode, FareId, Price};
    use crate::fares::ingest;
    use crate::fares::rule_set::test_support::*;
    use crate::feed::{FareAttributeRecord, FareRuleRecord};

    fn report(amount: &str) -> IngestReport {
        ingest(
            vec![FareAttributeRecord::new(
                FareId::new("F").unwrap(),
                Price::parse(amount).unwrap(),
                CurrencyCode::parse("USD").unwrap(),
            )],
            vec![],
        )
    }

    #[test]
    fn price_through_service() {
        let service = FareService::from_report(report("2.00"), FareConfig::default());
        let quote = service.price(&[ride("R", "1", "2")]).unwrap();
        assert_eq!(quote.total, Price::parse("2.00").unwrap());
    }

    #[test]
    fn reload_swaps_snapshot() {
        let service = FareService::from_report(report("2.00"), FareConfig::default());
        let before = service.snapshot();

        let errors = service.reload(report("3.00"));
        assert!(errors.is_empty());

        let quote = service.price(&[ride("R", "1", "2")]).unwrap();
        assert_eq!(quote.total, Price::parse("3.00").unwrap());

        // A snapshot taken before the reload is unaffected
        let config = FareConfig::default();
        let old = FarePricer::new(&before, &config)
            .price(&[ride("R", "1", "2")])
            .unwrap();
        assert_eq!(old.total, Price::parse("2.00").unwrap());
    }

    #[test]
    fn reload_returns_skipped_records() {
        let service = FareService::new(FareSnapshot::empty(), FareConfig::default());
        let report = ingest(vec![], vec![FareRuleRecord::new(FareId::new("X99").unwrap())]);
        let errors = service.reload(report);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn clones_share_the_slot() {
        let service = FareService::new(FareSnapshot::empty(), FareConfig::default());
        let other = service.clone();
        other.reload(report("1.00"));
        assert_eq!(service.snapshot().len(), 1);
    }

    #[test]
    fn concurrent_pricing() {
        let service = FareService::from_report(report("2.00"), FareConfig::default());
        let rides = vec![ride("R", "1", "2"), ride("R", "2", "3")];

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let service = service.clone();
                    let rides = rides.clone();
                    scope.spawn(move || service.price(&rides))
                })
                .collect();
            for handle in handles {
                let quote = handle.join().unwrap().unwrap();
                assert_eq!(quote.total, Price::parse("2.00").unwrap());
            }
        });
    }
}
