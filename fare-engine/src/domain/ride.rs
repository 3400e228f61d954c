//! Ride type.
//!
//! A `Ride` is one boarding-to-alighting segment of an itinerary on a
//! single route. Rides are supplied by the trip planner and are only
//! read by the fare engine.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{AgencyId, DomainError, RouteId, StopId, ZoneId};

/// A stop as seen by fare rules: its id and (optional) fare zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    #[serde(default)]
    pub zone: Option<ZoneId>,
}

impl Stop {
    /// Create a stop in the given zone.
    pub fn new(id: StopId, zone: Option<ZoneId>) -> Self {
        Self { id, zone }
    }
}

/// One ride of an itinerary.
///
/// # Invariants
///
/// - `alight_time >= board_time`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRide")]
pub struct Ride {
    board: Stop,
    alight: Stop,
    route: RouteId,
    agency: AgencyId,
    board_time: NaiveDateTime,
    alight_time: NaiveDateTime,
    via_zones: Vec<ZoneId>,
}

/// Unvalidated ride, as read from JSON.
#[derive(Deserialize)]
struct RawRide {
    board: Stop,
    alight: Stop,
    route: RouteId,
    agency: AgencyId,
    board_time: NaiveDateTime,
    alight_time: NaiveDateTime,
    #[serde(default)]
    via_zones: Vec<ZoneId>,
}

impl TryFrom<RawRide> for Ride {
    type Error = DomainError;

    fn try_from(raw: RawRide) -> Result<Self, Self::Error> {
        Ride::new(
            raw.board,
            raw.alight,
            raw.route,
            raw.agency,
            raw.board_time,
            raw.alight_time,
        )
        .map(|ride| ride.with_via_zones(raw.via_zones))
    }
}

impl Ride {
    /// Construct a ride, validating that it does not end before it starts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRide` if `alight_time < board_time`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fare_engine::domain::{AgencyId, Ride, RouteId, Stop, StopId, ZoneId};
    /// use chrono::NaiveDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let board = Stop::new(StopId::new("A").unwrap(), Some(ZoneId::new("1").unwrap()));
    /// let alight = Stop::new(StopId::new("B").unwrap(), Some(ZoneId::new("2").unwrap()));
    ///
    /// let ride = Ride::new(
    ///     board,
    ///     alight,
    ///     RouteId::new("R1").unwrap(),
    ///     AgencyId::new("agency").unwrap(),
    ///     day.and_hms_opt(10, 0, 0).unwrap(),
    ///     day.and_hms_opt(10, 25, 0).unwrap(),
    /// )
    /// .unwrap();
    /// assert_eq!(ride.duration().num_minutes(), 25);
    /// ```
    pub fn new(
        board: Stop,
        alight: Stop,
        route: RouteId,
        agency: AgencyId,
        board_time: NaiveDateTime,
        alight_time: NaiveDateTime,
    ) -> Result<Self, DomainError> {
        if alight_time < board_time {
            return Err(DomainError::InvalidRide("alight time must not precede board time"));
        }

        Ok(Ride {
            board,
            alight,
            route,
            agency,
            board_time,
            alight_time,
            via_zones: Vec::new(),
        })
    }

    /// Record zones of intermediate stops this ride passes through.
    pub fn with_via_zones(mut self, zones: Vec<ZoneId>) -> Self {
        self.via_zones = zones;
        self
    }

    /// Returns the boarding stop.
    pub fn board(&self) -> &Stop {
        &self.board
    }

    /// Returns the alighting stop.
    pub fn alight(&self) -> &Stop {
        &self.alight
    }

    /// Returns the boarding zone, if the stop has one.
    pub fn board_zone(&self) -> Option<&ZoneId> {
        self.board.zone.as_ref()
    }

    /// Returns the alighting zone, if the stop has one.
    pub fn alight_zone(&self) -> Option<&ZoneId> {
        self.alight.zone.as_ref()
    }

    pub fn route(&self) -> &RouteId {
        &self.route
    }

    pub fn agency(&self) -> &AgencyId {
        &self.agency
    }

    pub fn board_time(&self) -> NaiveDateTime {
        self.board_time
    }

    pub fn alight_time(&self) -> NaiveDateTime {
        self.alight_time
    }

    /// Returns the zones of intermediate stops.
    pub fn via_zones(&self) -> &[ZoneId] {
        &self.via_zones
    }

    /// Every zone this ride touches: boarding, intermediate, alighting.
    ///
    /// A stop without a zone yields `None`.
    pub fn zones_touched(&self) -> impl Iterator<Item = Option<&ZoneId>> {
        std::iter::once(self.board_zone())
            .chain(self.via_zones.iter().map(Some))
            .chain(std::iter::once(self.alight_zone()))
    }

    /// Returns the time spent on board.
    pub fn duration(&self) -> Duration {
        self.alight_time.signed_duration_since(self.board_time)
    }
}
