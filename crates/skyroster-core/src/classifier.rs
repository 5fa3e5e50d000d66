// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::model::{HaulType, Route, ScheduleConfiguration};
use std::collections::HashMap;

/// Upper bound (inclusive) of a short-haul flight, in minutes.
pub const SHORT_HAUL_MAX_MIN: u32 = 180;
/// Upper bound (inclusive) of a medium-haul flight, in minutes.
pub const MEDIUM_HAUL_MAX_MIN: u32 = 360;

/// Route lookup keyed by departure IATA code.
pub type RoutesByDeparture = HashMap<String, Vec<Route>>;

pub struct RouteClassifier;

impl RouteClassifier {
    pub fn classify(duration_min: u32) -> HaulType {
        if duration_min <= SHORT_HAUL_MAX_MIN {
            HaulType::Short
        } else if duration_min <= MEDIUM_HAUL_MAX_MIN {
            HaulType::Medium
        } else {
            HaulType::Long
        }
    }

    pub fn haul_of(route: &Route) -> HaulType {
        Self::classify(route.duration_min)
    }

    /// Groups routes by departure airport, keeping input order inside each group.
    pub fn group_by_departure(routes: &[Route]) -> RoutesByDeparture {
        let mut grouped: RoutesByDeparture = HashMap::new();
        for route in routes {
            grouped
                .entry(route.departure_iata.clone())
                .or_default()
                .push(route.clone());
        }
        grouped
    }

    pub fn filter<'a>(routes: &'a [Route], departure: &str, haul: HaulType) -> Vec<&'a Route> {
        routes
            .iter()
            .filter(|r| r.departure_iata == departure && Self::haul_of(r) == haul)
            .collect()
    }

    pub fn filter_to_airport<'a>(routes: &'a [Route], arrival: &str) -> Vec<&'a Route> {
        routes.iter().filter(|r| r.arrival_iata == arrival).collect()
    }

    pub fn filter_to_country<'a>(routes: &'a [Route], country: &str) -> Vec<&'a Route> {
        routes
            .iter()
            .filter(|r| r.arrival_country.eq_ignore_ascii_case(country))
            .collect()
    }

    /// True when the route is flown by the configured carrier: IATA match when the
    /// configuration names one, otherwise case-insensitive name match.
    pub fn operated_by(route: &Route, config: &ScheduleConfiguration) -> bool {
        match config.airline_iata.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => route.airline_iata.eq_ignore_ascii_case(code),
            _ => route
                .airline_name
                .trim()
                .eq_ignore_ascii_case(config.airline_name.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: u64, from: &str, to: &str, minutes: u32) -> Route {
        Route {
            id,
            departure_iata: from.into(),
            arrival_iata: to.into(),
            departure_city: String::new(),
            departure_country: String::new(),
            arrival_city: String::new(),
            arrival_country: if to == "CDG" { "France".into() } else { "Spain".into() },
            duration_min: minutes,
            distance_km: 0.0,
            airline_iata: "BA".into(),
            airline_name: "British Airways".into(),
        }
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(RouteClassifier::classify(0), HaulType::Short);
        assert_eq!(RouteClassifier::classify(180), HaulType::Short);
        assert_eq!(RouteClassifier::classify(181), HaulType::Medium);
        assert_eq!(RouteClassifier::classify(360), HaulType::Medium);
        assert_eq!(RouteClassifier::classify(361), HaulType::Long);
    }

    #[test]
    fn test_group_preserves_order() {
        let routes = vec![
            route(1, "LHR", "CDG", 80),
            route(2, "CDG", "LHR", 85),
            route(3, "LHR", "MAD", 140),
        ];
        let grouped = RouteClassifier::group_by_departure(&routes);
        let lhr: Vec<u64> = grouped["LHR"].iter().map(|r| r.id).collect();
        assert_eq!(lhr, vec![1, 3]);
        assert_eq!(grouped["CDG"].len(), 1);
    }

    #[test]
    fn test_filters() {
        let routes = vec![
            route(1, "LHR", "CDG", 80),
            route(2, "LHR", "MAD", 200),
            route(3, "MAD", "CDG", 110),
        ];
        let short_from_lhr = RouteClassifier::filter(&routes, "LHR", HaulType::Short);
        assert_eq!(short_from_lhr.len(), 1);
        assert_eq!(short_from_lhr[0].id, 1);
        assert_eq!(RouteClassifier::filter_to_airport(&routes, "CDG").len(), 2);
        assert_eq!(RouteClassifier::filter_to_country(&routes, "spain").len(), 1);
    }

    #[test]
    fn test_operated_by_prefers_iata() {
        let r = route(1, "LHR", "CDG", 80);
        let mut config = ScheduleConfiguration {
            airline_name: "Someone Else".into(),
            airline_iata: Some("ba".into()),
            ..Default::default()
        };
        assert!(RouteClassifier::operated_by(&r, &config));

        config.airline_iata = None;
        assert!(!RouteClassifier::operated_by(&r, &config));
        config.airline_name = "british airways".into();
        assert!(RouteClassifier::operated_by(&r, &config));
    }
}
