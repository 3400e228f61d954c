//! Fare rule sets and the group matching predicate.
//!
//! A [`FareRuleSet`] collects every `fare_rules` row of one fare product.
//! It answers a single question: may this product be used for this
//! [`RideGroup`]?

use std::collections::BTreeSet;

use chrono::Duration;

use crate::domain::{AgencyId, Ride, RouteId, ZoneId};

/// A contiguous, non-empty run of rides considered for one fare product.
#[derive(Debug, Clone, Copy)]
pub struct RideGroup<'a> {
    rides: &'a [Ride],
}

impl<'a> RideGroup<'a> {
    /// Wrap a slice of rides. Returns `None` for an empty slice.
    pub fn new(rides: &'a [Ride]) -> Option<Self> {
        if rides.is_empty() {
            None
        } else {
            Some(Self { rides })
        }
    }

    pub fn rides(&self) -> &'a [Ride] {
        self.rides
    }

    /// Returns the first ride of the group.
    pub fn first(&self) -> &'a Ride {
        // Non-empty by construction
        &self.rides[0]
    }

    /// Returns the last ride of the group.
    pub fn last(&self) -> &'a Ride {
        &self.rides[self.rides.len() - 1]
    }

    /// Zone of the group's first boarding stop.
    pub fn first_zone(&self) -> Option<&'a ZoneId> {
        self.first().board_zone()
    }

    /// Zone of the group's last alighting stop.
    pub fn last_zone(&self) -> Option<&'a ZoneId> {
        self.last().alight_zone()
    }

    /// Every zone touched by any ride in the group. Zoneless stops yield `None`.
    pub fn zones_touched(&self) -> impl Iterator<Item = Option<&'a ZoneId>> + 'a {
        self.rides.iter().flat_map(|r| r.zones_touched())
    }

    /// Route of each ride, in ride order.
    pub fn routes(&self) -> impl Iterator<Item = &'a RouteId> + 'a {
        self.rides.iter().map(Ride::route)
    }

    /// The agency operating every ride, or `None` if the group mixes agencies.
    pub fn single_agency(&self) -> Option<&'a AgencyId> {
        let agency = self.first().agency();
        self.rides
            .iter()
            .all(|r| r.agency() == agency)
            .then_some(agency)
    }

    /// Number of transfers made within the group.
    pub fn transfer_count(&self) -> usize {
        self.rides.len() - 1
    }

    /// Time from the first boarding to the last boarding.
    pub fn span(&self) -> Duration {
        self.last()
            .board_time()
            .signed_duration_since(self.first().board_time())
    }
}

/// The scoping constraints under which one fare product applies.
///
/// Three independent dimensions, each a set:
///
/// - **contains**: every zone the group touches must be in the set.
/// - **origin-destination**: the group's (first boarding zone, last
///   alighting zone) must match a stored pair. A `None` side is a wildcard.
/// - **routes**: every ride must use a route in the set.
///
/// Empty dimensions impose no constraint, so a rule set with no rules at
/// all matches every group (a flat fare).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FareRuleSet {
    contains: BTreeSet<ZoneId>,
    origin_destinations: BTreeSet<(Option<ZoneId>, Option<ZoneId>)>,
    routes: BTreeSet<RouteId>,
}

impl FareRuleSet {
    /// Create an empty (unrestricted) rule set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_contains(&mut self, zone: ZoneId) {
        self.contains.insert(zone);
    }

    /// Add an origin-destination pair. An absent side matches any zone.
    ///
    /// A pair with both sides absent carries no constraint and is ignored.
    pub fn add_origin_destination(&mut self, origin: Option<ZoneId>, destination: Option<ZoneId>) {
        if origin.is_none() && destination.is_none() {
            return;
        }
        self.origin_destinations.insert((origin, destination));
    }

    pub fn add_route(&mut self, route: RouteId) {
        self.routes.insert(route);
    }

    pub fn contains(&self) -> &BTreeSet<ZoneId> {
        &self.contains
    }

    pub fn origin_destinations(&self) -> &BTreeSet<(Option<ZoneId>, Option<ZoneId>)> {
        &self.origin_destinations
    }

    pub fn routes(&self) -> &BTreeSet<RouteId> {
        &self.routes
    }

    /// Returns true if no dimension carries a constraint.
    pub fn is_unrestricted(&self) -> bool {
        self.specificity() == 0
    }

    /// Number of constrained dimensions (0 to 3).
    pub fn specificity(&self) -> usize {
        [
            !self.contains.is_empty(),
            !self.origin_destinations.is_empty(),
            !self.routes.is_empty(),
        ]
        .into_iter()
        .filter(|&constrained| constrained)
        .count()
    }

    /// Whether this rule set admits the group.
    ///
    /// All non-empty dimensions must be satisfied. Pure function of its
    /// inputs.
    pub fn matches(&self, group: &RideGroup<'_>) -> bool {
        self.matches_origin_destination(group)
            && self.matches_contains(group)
            && self.matches_routes(group)
    }

    fn matches_origin_destination(&self, group: &RideGroup<'_>) -> bool {
        if self.origin_destinations.is_empty() {
            return true;
        }
        let origin = group.first_zone();
        let destination = group.last_zone();
        self.origin_destinations.iter().any(|(o, d)| {
            side_matches(o.as_ref(), origin) && side_matches(d.as_ref(), destination)
        })
    }

    fn matches_contains(&self, group: &RideGroup<'_>) -> bool {
        if self.contains.is_empty() {
            return true;
        }
        group
            .zones_touched()
            .all(|zone| zone.is_some_and(|z| self.contains.contains(z)))
    }

    fn matches_routes(&self, group: &RideGroup<'_>) -> bool {
        if self.routes.is_empty() {
            return true;
        }
        group.routes().all(|route| self.routes.contains(route))
    }
}

/// A stored side matches when it is a wildcard or equals the actual zone.
fn side_matches(rule: Option<&ZoneId>, actual: Option<&ZoneId>) -> bool {
    match rule {
        None => true,
        Some(zone) => actual == Some(zone),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::domain::{AgencyId, Ride, RouteId, Stop, StopId, ZoneId};

    pub fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    pub fn zone(s: &str) -> ZoneId {
        ZoneId::new(s).unwrap()
    }

    pub fn route(s: &str) -> RouteId {
        RouteId::new(s).unwrap()
    }

    /// A ride between two zones, boarding at `start` minutes past 08:00.
    pub fn ride_on(agency: &str, route_id: &str, from: &str, to: &str, start: u32) -> Ride {
        let board = Stop::new(StopId::new(format!("{from}-stop")).unwrap(), Some(zone(from)));
        let alight = Stop::new(StopId::new(format!("{to}-stop")).unwrap(), Some(zone(to)));
        let board_time = at(8 + start / 60, start % 60);
        let alight_time = board_time + chrono::Duration::minutes(10);
        Ride::new(
            board,
            alight,
            route(route_id),
            AgencyId::new(agency).unwrap(),
            board_time,
            alight_time,
        )
        .unwrap()
    }

    pub fn ride(route_id: &str, from: &str, to: &str) -> Ride {
        ride_on("AG", route_id, from, to, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn group(rides: &[Ride]) -> RideGroup<'_> {
        RideGroup::new(rides).unwrap()
    }

    #[test]
    fn empty_group_rejected() {
        assert!(RideGroup::new(&[]).is_none());
    }

    #[test]
    fn group_accessors() {
        let rides = vec![
            ride_on("AG", "R1", "1", "2", 0),
            ride_on("AG", "R2", "2", "3", 25),
        ];
        let g = group(&rides);
        assert_eq!(g.first_zone(), Some(&zone("1")));
        assert_eq!(g.last_zone(), Some(&zone("3")));
        assert_eq!(g.transfer_count(), 1);
        assert_eq!(g.span(), Duration::minutes(25));
        assert_eq!(g.single_agency().map(|a| a.as_str()), Some("AG"));
        let routes: Vec<_> = g.routes().map(|r| r.as_str()).collect();
        assert_eq!(routes, vec!["R1", "R2"]);
    }

    #[test]
    fn mixed_agency_group() {
        let rides = vec![ride_on("A", "R1", "1", "2", 0), ride_on("B", "R2", "2", "3", 5)];
        assert!(group(&rides).single_agency().is_none());
    }

    #[test]
    fn unrestricted_matches_everything() {
        let rules = FareRuleSet::new();
        assert!(rules.is_unrestricted());
        let rides = vec![ride("R1", "1", "9"), ride("R7", "4", "2")];
        assert!(rules.matches(&group(&rides)));
        assert!(rules.matches(&group(&rides[..1])));
    }

    #[test]
    fn contains_requires_all_zones_inside() {
        let mut rules = FareRuleSet::new();
        rules.add_contains(zone("1"));
        rules.add_contains(zone("2"));

        let inside = vec![ride("R", "1", "2"), ride("R", "2", "1")];
        assert!(rules.matches(&group(&inside)));

        let partly_outside = vec![ride("R", "1", "2"), ride("R", "2", "3")];
        assert!(!rules.matches(&group(&partly_outside)));
    }

    #[test]
    fn contains_is_subset_not_equality() {
        let mut rules = FareRuleSet::new();
        rules.add_contains(zone("1"));
        rules.add_contains(zone("2"));
        let only_zone_one = vec![ride("R", "1", "1")];
        assert!(rules.matches(&group(&only_zone_one)));
    }

    #[test]
    fn contains_checks_via_zones() {
        let mut rules = FareRuleSet::new();
        rules.add_contains(zone("1"));
        let rides = vec![ride("R", "1", "1").with_via_zones(vec![zone("2")])];
        assert!(!rules.matches(&group(&rides)));
    }

    #[test]
    fn contains_rejects_zoneless_stop() {
        let mut rules = FareRuleSet::new();
        rules.add_contains(zone("1"));
        let r = ride("R", "1", "1");
        let zoneless = crate::domain::Ride::new(
            r.board().clone(),
            crate::domain::Stop::new(r.alight().id.clone(), None),
            r.route().clone(),
            r.agency().clone(),
            r.board_time(),
            r.alight_time(),
        )
        .unwrap();
        assert!(!rules.matches(&group(std::slice::from_ref(&zoneless))));
    }

    #[test]
    fn origin_destination_exact() {
        let mut rules = FareRuleSet::new();
        rules.add_origin_destination(Some(zone("1")), Some(zone("3")));

        let rides = vec![ride("R", "1", "2"), ride("R", "2", "3")];
        assert!(rules.matches(&group(&rides)));
        // Single ride 1 -> 2 does not end in zone 3
        assert!(!rules.matches(&group(&rides[..1])));
    }

    #[test]
    fn origin_destination_wildcard_destination() {
        let mut rules = FareRuleSet::new();
        rules.add_origin_destination(Some(zone("Z1")), None);
        assert!(rules.matches(&group(&[ride("R", "Z1", "Z7")])));
        assert!(rules.matches(&group(&[ride("R", "Z1", "Z1")])));
        assert!(!rules.matches(&group(&[ride("R", "Z2", "Z1")])));
    }

    #[test]
    fn origin_destination_wildcard_origin() {
        let mut rules = FareRuleSet::new();
        rules.add_origin_destination(None, Some(zone("Z1")));
        assert!(rules.matches(&group(&[ride("R", "Z4", "Z1")])));
        assert!(!rules.matches(&group(&[ride("R", "Z1", "Z4")])));
    }

    #[test]
    fn both_sides_absent_ignored() {
        let mut rules = FareRuleSet::new();
        rules.add_origin_destination(None, None);
        assert!(rules.is_unrestricted());
    }

    #[test]
    fn routes_require_every_ride() {
        let mut rules = FareRuleSet::new();
        rules.add_route(route("R1"));

        let same = vec![ride("R1", "1", "2"), ride("R1", "2", "3")];
        assert!(rules.matches(&group(&same)));

        let mixed = vec![ride("R1", "1", "2"), ride("R2", "2", "3")];
        assert!(!rules.matches(&group(&mixed)));
    }

    #[test]
    fn dimensions_are_anded() {
        let mut rules = FareRuleSet::new();
        rules.add_route(route("R1"));
        rules.add_contains(zone("1"));
        assert_eq!(rules.specificity(), 2);

        // Route ok, zone outside
        assert!(!rules.matches(&group(&[ride("R1", "1", "2")])));
        // Zone ok, route wrong
        assert!(!rules.matches(&group(&[ride("R2", "1", "1")])));
        // Both ok
        assert!(rules.matches(&group(&[ride("R1", "1", "1")])));
    }

    #[test]
    fn specificity_counts_dimensions() {
        let mut rules = FareRuleSet::new();
        assert_eq!(rules.specificity(), 0);
        rules.add_contains(zone("1"));
        rules.add_contains(zone("2"));
        assert_eq!(rules.specificity(), 1);
        rules.add_origin_destination(Some(zone("1")), None);
        rules.add_route(route("R"));
        assert_eq!(rules.specificity(), 3);
    }
}

#[cfg(test)]
mod proptests {
    use super::test_support::*;
    use super::*;
    use proptest::prelude::*;

    fn zone_name() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["1", "2", "3", "4"]).prop_map(str::to_string)
    }

    fn rides_strategy() -> impl Strategy<Value = Vec<Ride>> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["R1", "R2", "R3"]),
                zone_name(),
                zone_name(),
            ),
            1..6,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .map(|(r, from, to)| ride(r, &from, &to))
                .collect()
        })
    }

    proptest! {
        /// Property: an unrestricted rule set matches any group.
        #[test]
        fn vacuous_match(rides in rides_strategy()) {
            let g = RideGroup::new(&rides).unwrap();
            prop_assert!(FareRuleSet::new().matches(&g));
        }

        /// Property: the predicate is deterministic.
        #[test]
        fn deterministic(rides in rides_strategy(), zones in prop::collection::vec(zone_name(), 0..3)) {
            let mut rules = FareRuleSet::new();
            for z in zones {
                rules.add_contains(zone(&z));
            }
            let g = RideGroup::new(&rides).unwrap();
            prop_assert_eq!(rules.matches(&g), rules.matches(&g));
        }

        /// Property: a contains set of every zone matches any zoned group.
        #[test]
        fn contains_all_zones_matches(rides in rides_strategy()) {
            let mut rules = FareRuleSet::new();
            for z in ["1", "2", "3", "4"] {
                rules.add_contains(zone(z));
            }
            let g = RideGroup::new(&rides).unwrap();
            prop_assert!(rules.matches(&g));
        }

        /// Property: adding a constraint dimension never widens the match.
        #[test]
        fn adding_dimension_only_narrows(rides in rides_strategy(), z in zone_name()) {
            let g = RideGroup::new(&rides).unwrap();
            let mut rules = FareRuleSet::new();
            rules.add_route(route("R1"));
            let before = rules.matches(&g);
            rules.add_contains(zone(&z));
            let after = rules.matches(&g);
            prop_assert!(!after || before);
        }
    }
}
