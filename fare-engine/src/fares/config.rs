//! Pricing configuration for the fare engine.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How to choose between several products that all match one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// The cheapest matching product.
    #[default]
    Cheapest,

    /// The product whose rule set constrains the most dimensions;
    /// cheapest among equally specific products.
    MostSpecific,
}

/// Configuration parameters for fare pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FareConfig {
    /// Product choice when a group matches several products.
    pub selection: SelectionPolicy,

    /// Whether a product's transfer count and transfer duration limit
    /// which groups it can cover.
    pub enforce_transfer_policy: bool,

    /// Longest itinerary (in rides) accepted for pricing.
    /// Search cost grows with the square of this.
    pub max_rides: usize,
}

impl FareConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        selection: SelectionPolicy,
        enforce_transfer_policy: bool,
        max_rides: usize,
    ) -> Self {
        Self {
            selection,
            enforce_transfer_policy,
            max_rides,
        }
    }
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            selection: SelectionPolicy::Cheapest,
            enforce_transfer_policy: true,
            max_rides: 32,
        }
    }
}
