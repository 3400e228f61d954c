//! Domain types for the fare engine.
//!
//! This module contains the value types that fare products, fare rules and
//! rides are built from. All types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod currency;
mod error;
mod ids;
mod price;
mod ride;

pub use currency::{CurrencyCode, InvalidCurrency};
pub use error::DomainError;
pub use ids::{AgencyId, FareId, InvalidId, RouteId, StopId, ZoneId};
pub use price::{InvalidPrice, Price};
pub use ride::{Ride, Stop};
