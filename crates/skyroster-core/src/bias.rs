// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::model::{Route, ScheduleConfiguration};
use std::collections::{HashMap, HashSet};

pub const COUNTRY_BONUS: f64 = 1.4;
pub const REGION_BONUS: f64 = 1.2;
/// Floor of the novelty multiplier, reached after seven prior visits.
pub const NOVELTY_FLOOR: f64 = 0.3;
pub const NOVELTY_DECAY_PER_VISIT: f64 = 0.1;

/// Maps a country name to its broad region. Unknown countries have no region.
pub fn region_for_country(country: &str) -> Option<&'static str> {
    let region = match country.trim().to_lowercase().as_str() {
        "united kingdom" | "ireland" | "france" | "germany" | "spain" | "portugal" | "italy"
        | "netherlands" | "belgium" | "luxembourg" | "switzerland" | "austria" | "denmark"
        | "norway" | "sweden" | "finland" | "iceland" | "poland" | "czech republic"
        | "czechia" | "slovakia" | "hungary" | "romania" | "bulgaria" | "greece" | "croatia"
        | "serbia" | "slovenia" | "malta" | "cyprus" | "estonia" | "latvia" | "lithuania"
        | "ukraine" | "turkey" | "albania" | "montenegro" | "north macedonia"
        | "bosnia and herzegovina" => "Europe",

        "united arab emirates" | "qatar" | "saudi arabia" | "bahrain" | "kuwait" | "oman"
        | "jordan" | "israel" | "lebanon" | "iran" | "iraq" => "Middle East",

        "united states" | "canada" | "mexico" => "North America",

        "guatemala" | "belize" | "honduras" | "el salvador" | "nicaragua" | "costa rica"
        | "panama" => "Central America",

        "cuba" | "jamaica" | "bahamas" | "barbados" | "dominican republic" | "puerto rico"
        | "trinidad and tobago" | "antigua and barbuda" | "saint lucia" => "Caribbean",

        "brazil" | "argentina" | "chile" | "peru" | "colombia" | "ecuador" | "venezuela"
        | "uruguay" | "paraguay" | "bolivia" => "South America",

        "egypt" | "morocco" | "tunisia" | "algeria" | "south africa" | "kenya" | "nigeria"
        | "ethiopia" | "ghana" | "tanzania" | "senegal" | "mauritius" | "seychelles" => "Africa",

        "china" | "japan" | "south korea" | "india" | "pakistan" | "sri lanka" | "maldives"
        | "thailand" | "vietnam" | "malaysia" | "singapore" | "indonesia" | "philippines"
        | "hong kong" | "taiwan" | "bangladesh" | "nepal" | "cambodia" => "Asia",

        "australia" | "new zealand" | "fiji" | "papua new guinea" => "Oceania",

        _ => return None,
    };
    Some(region)
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|v| v.trim().eq_ignore_ascii_case(value.trim()))
}

/// Selection weight of a single candidate route.
///
/// Order matters: the repetition boost (or strict zeroing) comes first, country/region
/// bonuses only apply below strict repetition, and novelty decay is skipped for
/// destinations that are already preferred.
pub fn route_weight(
    route: &Route,
    config: &ScheduleConfiguration,
    visit_counts: &HashMap<String, u32>,
    preferred_airports: &HashSet<String>,
) -> f64 {
    let bias = config.repetition_bias();
    let mut weight = 1.0;

    let repetition_active = bias > 0.0 && !preferred_airports.is_empty();
    let is_preferred = repetition_active && preferred_airports.contains(&route.arrival_iata);
    if repetition_active {
        if is_preferred {
            weight *= 1.0 + bias;
        } else if config.strict_repetition() {
            weight = 0.0;
        }
    }

    if bias < 1.0 {
        if contains_ignore_case(&config.preferred_countries, &route.arrival_country) {
            weight *= COUNTRY_BONUS;
        }
        if let Some(region) = region_for_country(&route.arrival_country) {
            if contains_ignore_case(&config.preferred_regions, region) {
                weight *= REGION_BONUS;
            }
        }
    }

    if !is_preferred {
        let visits = visit_counts.get(&route.arrival_iata).copied().unwrap_or(0);
        let novelty = (1.0 - NOVELTY_DECAY_PER_VISIT * f64::from(visits)).max(NOVELTY_FLOOR);
        weight *= novelty;
    }

    weight
}

pub fn route_weights(
    routes: &[&Route],
    config: &ScheduleConfiguration,
    visit_counts: &HashMap<String, u32>,
    preferred_airports: &HashSet<String>,
) -> Vec<f64> {
    routes
        .iter()
        .map(|r| route_weight(r, config, visit_counts, preferred_airports))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(to: &str, country: &str) -> Route {
        Route {
            id: 1,
            departure_iata: "LHR".into(),
            arrival_iata: to.into(),
            departure_city: String::new(),
            departure_country: "United Kingdom".into(),
            arrival_city: String::new(),
            arrival_country: country.into(),
            duration_min: 90,
            distance_km: 0.0,
            airline_iata: String::new(),
            airline_name: String::new(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_neutral_weight() {
        let config = ScheduleConfiguration::default();
        let w = route_weight(&route("CDG", "France"), &config, &HashMap::new(), &HashSet::new());
        assert!(approx(w, 1.0));
    }

    #[test]
    fn test_country_and_region_bonus_stack() {
        let config = ScheduleConfiguration {
            preferred_countries: vec!["france".into()],
            preferred_regions: vec!["Europe".into()],
            ..Default::default()
        };
        let w = route_weight(&route("CDG", "France"), &config, &HashMap::new(), &HashSet::new());
        assert!(approx(w, 1.4 * 1.2));

        // Unknown country: no region, no bonus.
        let w = route_weight(&route("XXX", "Atlantis"), &config, &HashMap::new(), &HashSet::new());
        assert!(approx(w, 1.0));
    }

    #[test]
    fn test_novelty_decay_floors() {
        let config = ScheduleConfiguration::default();
        let mut visits = HashMap::new();
        visits.insert("CDG".to_string(), 2);
        let w = route_weight(&route("CDG", "France"), &config, &visits, &HashSet::new());
        assert!(approx(w, 0.8));

        visits.insert("CDG".to_string(), 12);
        let w = route_weight(&route("CDG", "France"), &config, &visits, &HashSet::new());
        assert!(approx(w, NOVELTY_FLOOR));
    }

    #[test]
    fn test_partial_repetition_boosts_preferred_and_skips_novelty() {
        let config = ScheduleConfiguration {
            destination_repetition_bias: Some(0.5),
            preferred_countries: vec!["France".into()],
            ..Default::default()
        };
        let mut visits = HashMap::new();
        visits.insert("CDG".to_string(), 3);
        let preferred: HashSet<String> = ["CDG".to_string()].into_iter().collect();

        let w = route_weight(&route("CDG", "France"), &config, &visits, &preferred);
        assert!(approx(w, 1.5 * 1.4));

        let w = route_weight(&route("MAD", "Spain"), &config, &visits, &preferred);
        assert!(approx(w, 1.0));
    }

    #[test]
    fn test_strict_repetition_zeroes_others_and_ignores_countries() {
        let config = ScheduleConfiguration {
            destination_repetition_bias: Some(1.0),
            preferred_countries: vec!["Spain".into()],
            ..Default::default()
        };
        let preferred: HashSet<String> = ["CDG".to_string()].into_iter().collect();
        let routes = [route("CDG", "France"), route("MAD", "Spain")];
        let refs: Vec<&Route> = routes.iter().collect();
        let weights = route_weights(&refs, &config, &HashMap::new(), &preferred);
        assert!(approx(weights[0], 2.0));
        assert!(approx(weights[1], 0.0));
    }

    #[test]
    fn test_repetition_without_preferred_set_falls_through() {
        let config = ScheduleConfiguration {
            destination_repetition_bias: Some(0.4),
            preferred_countries: vec!["France".into()],
            ..Default::default()
        };
        let w = route_weight(&route("CDG", "France"), &config, &HashMap::new(), &HashSet::new());
        assert!(approx(w, 1.4));
    }

    #[test]
    fn test_region_lookup() {
        assert_eq!(region_for_country("Japan"), Some("Asia"));
        assert_eq!(region_for_country(" united states "), Some("North America"));
        assert_eq!(region_for_country("Narnia"), None);
    }
}
