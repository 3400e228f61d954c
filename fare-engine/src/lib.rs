//! GTFS fare engine.
//!
//! Ingests a feed's fare attributes and fare rules, then answers: "what is
//! the cheapest legal way to pay for this sequence of rides?"

pub mod domain;
pub mod fares;
pub mod feed;
