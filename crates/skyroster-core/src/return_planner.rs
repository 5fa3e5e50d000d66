// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::classifier::{RouteClassifier, RoutesByDeparture};
use crate::model::{DaySchedule, FlightLeg, HaulType, Route, ScheduleConfiguration};
use crate::state::GeneratorState;
use crate::timing;
use chrono::Duration;
use log::{debug, warn};

/// Delay after opening before a forced recovery flight departs.
pub const FORCED_RETURN_DELAY_MIN: i64 = 60;

pub struct ReturnPlanner;

impl ReturnPlanner {
    /// Direct routes from the current airport to base flown by the configured carrier,
    /// restricted to `haul` or, when absent, to `fallback` haul types.
    fn routes_home<'a>(
        state: &GeneratorState,
        config: &ScheduleConfiguration,
        routes: &'a RoutesByDeparture,
        haul: Option<HaulType>,
        fallback: &[HaulType],
    ) -> Vec<&'a Route> {
        let Some(departing) = routes.get(&state.current_airport) else {
            return Vec::new();
        };
        departing
            .iter()
            .filter(|r| r.arrival_iata == config.base_airport)
            .filter(|r| RouteClassifier::operated_by(r, config))
            .filter(|r| {
                let h = RouteClassifier::haul_of(r);
                match haul {
                    Some(wanted) => h == wanted,
                    None => fallback.contains(&h),
                }
            })
            .collect()
    }

    /// Configured haul types, minus long haul while a rest block is active.
    fn usable_hauls(state: &GeneratorState, config: &ScheduleConfiguration) -> Vec<HaulType> {
        let blocked = state.long_haul_blocked();
        config
            .haul_preferences
            .allowed()
            .into_iter()
            .filter(|h| !(blocked && *h == HaulType::Long))
            .collect()
    }

    /// Earliest flight home from the current position. Without an explicit `haul`, any
    /// configured type qualifies except long haul during a rest block. `None` when already
    /// at base or when no direct route exists.
    pub fn plan_return_to_base(
        state: &GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
        haul: Option<HaulType>,
    ) -> Option<FlightLeg> {
        if state.at_base(config) {
            return None;
        }
        let allowed = Self::usable_hauls(state, config);
        let candidates = Self::routes_home(state, config, routes, haul, &allowed);
        let found = timing::find_earliest_return_flight(
            state.current_time,
            &state.current_airport,
            &config.base_airport,
            &candidates,
            config,
        )?;
        let leg = FlightLeg::from_route(
            found.route,
            RouteClassifier::haul_of(found.route),
            found.departure,
            config,
        );
        debug!(
            "Planned return {} -> {} departing {}",
            leg.departure_airport,
            leg.arrival_airport,
            leg.departure_time.format("%Y-%m-%d %H:%M")
        );
        Some(leg)
    }

    /// Deterministic recovery day: the shortest direct route home on a usable haul type,
    /// departing one hour after opening on the state's current date (or after turnaround,
    /// if later). The departure never leaves operating hours.
    pub fn plan_forced_return(
        state: &GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
        day_number: u32,
        haul: Option<HaulType>,
    ) -> Option<DaySchedule> {
        if state.at_base(config) {
            return None;
        }
        let allowed = Self::usable_hauls(state, config);
        let candidates = Self::routes_home(state, config, routes, haul, &allowed);
        let Some(route) = candidates.into_iter().min_by_key(|r| r.duration_min) else {
            warn!(
                "Forced return impossible: no direct route {} -> {} on an allowed haul type",
                state.current_airport, config.base_airport
            );
            return None;
        };

        let hours = &config.operating_hours;
        let scheduled = timing::saturating_add(
            timing::day_start(state.current_date, hours),
            Duration::minutes(FORCED_RETURN_DELAY_MIN),
        )
        .min(timing::at(state.current_date, hours.end));
        let mut departure = scheduled.max(timing::earliest_departure(state.current_time, config));
        if !timing::instant_within_operating_hours(departure, hours) {
            departure = timing::next_opening(departure, hours);
        }
        let leg = FlightLeg::from_route(route, RouteClassifier::haul_of(route), departure, config);

        let mut day = DaySchedule::new(day_number, departure.date_naive(), &config.base_airport);
        day.notes.push(format!(
            "Forced return to base {} from {} after {} night(s) away",
            config.base_airport, state.current_airport, state.consecutive_days_away_from_base
        ));
        day.legs.push(leg);
        Some(day)
    }

    /// Same-day direct return feasibility from the current position.
    pub fn is_return_feasible(
        state: &GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
    ) -> bool {
        let candidates = Self::routes_home(state, config, routes, None, &HaulType::ALL);
        timing::is_return_feasible(
            state.current_time,
            &state.current_airport,
            &config.base_airport,
            &candidates,
            config,
        )
    }
}
