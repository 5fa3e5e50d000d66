// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Trip planning for a single calendar day.
//!
//! A day is a loop of trips that start and end at base. Each trip is an outbound leg,
//! an optional onward leg and a return leg flown on the same haul type. The loop stops
//! when a trip cannot be completed, when a leg slips past midnight (those legs are
//! queued on the run state for the following day), or when no further departure fits
//! before curfew.

use crate::classifier::RoutesByDeparture;
use crate::model::{DaySchedule, FlightLeg, HaulType, ScheduleConfiguration};
use crate::return_planner::ReturnPlanner;
use crate::selector::{weighted_index, LegRequest, LegSelector};
use crate::state::GeneratorState;
use crate::timing;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use rand::Rng;

/// Nights away from base after which the next day is a forced return.
pub const MAX_NIGHTS_AWAY: u32 = 2;
/// Hard cap on trips per day so degenerate route tables still terminate.
pub const MAX_TRIPS_PER_DAY: usize = 24;
/// Weight floor used when the haul-type draw falls back to all types.
pub const FALLBACK_HAUL_WEIGHT: f64 = 0.1;

/// Outcome of a haul-type draw.
#[derive(Debug, Clone, PartialEq)]
pub enum HaulSelection {
    Selected(HaulType),
    Unavailable(String),
}

enum TripOutcome {
    /// Trip flown; `crossed` is set when some legs were deferred to a later date.
    Completed { crossed: bool },
    /// No first leg could be found.
    NoDeparture,
    /// Outbound flown but no way home.
    Stranded { crossed: bool },
}

pub struct DailyScheduler;

impl DailyScheduler {
    fn draw_haul<R: Rng + ?Sized>(
        candidates: &[HaulType],
        weights: &[f64],
        rng: &mut R,
    ) -> HaulSelection {
        if candidates.is_empty() {
            return HaulSelection::Unavailable("no haul type is allowed".to_string());
        }
        match weighted_index(weights, rng) {
            Some(i) => HaulSelection::Selected(candidates[i]),
            None => HaulSelection::Unavailable("haul type draw failed".to_string()),
        }
    }

    /// Draws the day's haul type from the configured preferences, excluding long haul
    /// while a rest block is active.
    pub fn select_day_haul_type<R: Rng + ?Sized>(
        state: &GeneratorState,
        config: &ScheduleConfiguration,
        rng: &mut R,
    ) -> HaulSelection {
        let blocked = state.long_haul_blocked();
        let candidates: Vec<HaulType> = config
            .haul_preferences
            .allowed()
            .into_iter()
            .filter(|h| !(blocked && *h == HaulType::Long))
            .collect();
        let weights: Vec<f64> = candidates
            .iter()
            .map(|h| config.haul_weighting.weight(*h))
            .collect();
        match Self::draw_haul(&candidates, &weights, rng) {
            HaulSelection::Unavailable(reason) if blocked => HaulSelection::Unavailable(
                format!("{reason} (long haul blocked by rest period)"),
            ),
            other => other,
        }
    }

    /// Haul type for the day with the full fallback chain: configured preferences, then
    /// every type at a floored weight, then short haul.
    pub fn resolve_day_haul_type<R: Rng + ?Sized>(
        state: &GeneratorState,
        config: &ScheduleConfiguration,
        notes: &mut Vec<String>,
        rng: &mut R,
    ) -> HaulType {
        let reason = match Self::select_day_haul_type(state, config, rng) {
            HaulSelection::Selected(haul) => return haul,
            HaulSelection::Unavailable(reason) => reason,
        };

        let blocked = state.long_haul_blocked();
        let candidates: Vec<HaulType> = HaulType::ALL
            .into_iter()
            .filter(|h| !(blocked && *h == HaulType::Long))
            .collect();
        let weights: Vec<f64> = candidates
            .iter()
            .map(|h| config.haul_weighting.weight(*h).max(FALLBACK_HAUL_WEIGHT))
            .collect();

        match Self::draw_haul(&candidates, &weights, rng) {
            HaulSelection::Selected(haul) => {
                notes.push(format!(
                    "Haul preferences unusable ({reason}); temporarily allowing {haul} haul"
                ));
                haul
            }
            HaulSelection::Unavailable(again) => {
                warn!("Haul type fallback exhausted ({reason}; {again}); defaulting to short haul");
                notes.push("No haul type available; defaulting to short haul".to_string());
                HaulType::Short
            }
        }
    }

    /// Builds one day. `seed_legs` are legs deferred from the previous day; they are
    /// flown first, before any new trip is planned.
    pub fn plan_day<R: Rng + ?Sized>(
        state: &mut GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
        day_number: u32,
        seed_legs: Vec<FlightLeg>,
        rng: &mut R,
    ) -> DaySchedule {
        let mut day = DaySchedule::new(day_number, state.current_date, &state.current_airport);

        if !seed_legs.is_empty() {
            day.notes.push(format!(
                "{} leg(s) carried over from the previous day",
                seed_legs.len()
            ));
            for leg in seed_legs {
                state.fly(&leg);
                day.legs.push(leg);
            }
        }

        Self::continue_day(state, config, routes, day, rng)
    }

    /// Plans new trips onto a day whose existing legs have already been flown, then
    /// closes it. Used after carried-over legs and after a forced return.
    pub fn continue_day<R: Rng + ?Sized>(
        state: &mut GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
        mut day: DaySchedule,
        rng: &mut R,
    ) -> DaySchedule {
        let day_number = day.day;
        let haul = Self::resolve_day_haul_type(state, config, &mut day.notes, rng);
        debug!("Day {} ({}) haul type: {}", day_number, day.date, haul);

        // Legs still queued for a later date keep the aircraft committed.
        let mut crossed = Self::crosses_day(state, &day) || !state.future_legs.is_empty();

        if !crossed && !state.at_base(config) {
            crossed = Self::return_home(state, config, routes, haul, &mut day);
        }

        let mut first_selection = true;
        let mut repeat_template: Option<Vec<FlightLeg>> = None;
        let mut trips = 0usize;

        while !crossed && state.at_base(config) && trips < MAX_TRIPS_PER_DAY {
            let outcome = match repeat_template.as_ref() {
                Some(template) if config.repetition_mode() => {
                    match Self::replay_trip(state, config, template, &mut day) {
                        Some(outcome) => outcome,
                        None => break,
                    }
                }
                _ => {
                    let outcome = Self::plan_trip(
                        state,
                        config,
                        routes,
                        haul,
                        first_selection,
                        &mut day,
                        rng,
                    );
                    first_selection = false;
                    outcome
                }
            };
            trips += 1;

            match outcome {
                TripOutcome::NoDeparture => {
                    day.notes.push(format!(
                        "No suitable {} haul departure from {}; no further trips today",
                        haul, state.current_airport
                    ));
                    break;
                }
                TripOutcome::Stranded { crossed: c } => {
                    crossed = c;
                    break;
                }
                TripOutcome::Completed { crossed: c } => {
                    crossed = c;
                    if crossed {
                        break;
                    }
                }
            }

            if config.repetition_mode() && repeat_template.is_none() {
                let len = day.legs.len();
                if len >= 2 {
                    repeat_template = Some(day.legs[len - 2..].to_vec());
                }
            }

            if haul == HaulType::Long {
                debug!("Long haul trip complete; crew rest ends the day");
                break;
            }

            let next_departure = timing::earliest_departure(state.current_time, config);
            if next_departure.date_naive() != day.date
                || !timing::instant_within_operating_hours(next_departure, &config.operating_hours)
            {
                debug!(
                    "Next departure {} misses operating hours; day {} complete",
                    next_departure.format("%Y-%m-%d %H:%M"),
                    day_number
                );
                break;
            }
        }

        if crossed {
            day.notes.push(format!(
                "{} leg(s) slipped past midnight and continue on the next day",
                state.future_legs.len()
            ));
        }

        if haul == HaulType::Long && day.legs.iter().any(|l| l.haul_type == HaulType::Long) {
            let rest = Duration::hours(i64::from(config.minimum_rest_hours_between_long_haul));
            let until = state.current_time.checked_add_signed(rest).unwrap_or_else(|| {
                warn!(
                    "Rest period of {}h overflows the calendar; long haul blocked for the rest of the run",
                    config.minimum_rest_hours_between_long_haul
                );
                DateTime::<Utc>::MAX_UTC
            });
            state.long_haul_blocked_until = Some(until);
            day.notes.push(format!(
                "Long haul rest block set until {}",
                until.format("%Y-%m-%d %H:%M")
            ));
        }

        Self::close_day(state, config, &mut day);
        info!(
            "Day {} ({}): {} leg(s), overnight at {}",
            day.day,
            day.date,
            day.legs.len(),
            day.overnight_location
        );
        day
    }

    fn crosses_day(state: &GeneratorState, day: &DaySchedule) -> bool {
        state.current_time.date_naive() > day.date
    }

    fn close_day(state: &mut GeneratorState, config: &ScheduleConfiguration, day: &mut DaySchedule) {
        day.overnight_location = state.current_airport.clone();
        state.close_day(config);
        if !state.at_base(config) {
            day.notes.push(format!(
                "Overnight away from base at {} ({} consecutive night(s))",
                state.current_airport, state.consecutive_days_away_from_base
            ));
            if state.consecutive_days_away_from_base >= MAX_NIGHTS_AWAY {
                day.notes.push(format!(
                    "Forced return to {} will be imposed next day",
                    config.base_airport
                ));
            }
        }
    }

    /// Brings an aircraft that starts the day away from base home before any new trip.
    fn return_home(
        state: &mut GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
        haul: HaulType,
        day: &mut DaySchedule,
    ) -> bool {
        let origin = state.current_airport.clone();
        let leg = ReturnPlanner::plan_return_to_base(state, config, routes, Some(haul))
            .or_else(|| ReturnPlanner::plan_return_to_base(state, config, routes, None));
        match leg {
            Some(leg) => {
                day.notes.push(format!(
                    "Returning to base {} from {}",
                    config.base_airport, origin
                ));
                state.record_leg(&leg, config);
                let start = (state.current_airport.clone(), state.current_time);
                state.fly(&leg);
                Self::commit_trip(state, day, vec![leg], start)
            }
            None => {
                day.notes.push(format!(
                    "Day starts away from base at {}; no return route available",
                    origin
                ));
                false
            }
        }
    }

    fn plan_trip<R: Rng + ?Sized>(
        state: &mut GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
        haul: HaulType,
        first_of_day: bool,
        day: &mut DaySchedule,
        rng: &mut R,
    ) -> TripOutcome {
        let start = (state.current_airport.clone(), state.current_time);

        let Some(outbound) = LegSelector::select_leg(
            state,
            config,
            routes,
            LegRequest::outbound(haul, first_of_day),
            rng,
        ) else {
            return TripOutcome::NoDeparture;
        };
        let trip_haul = outbound.haul_type;
        state.record_leg(&outbound, config);
        state.fly(&outbound);
        let mut legs = vec![outbound];

        let multi_stop = haul != HaulType::Long
            && !config.repetition_mode()
            && rng.gen::<f64>() >= config.single_destination_ratio;
        if multi_stop {
            match LegSelector::select_leg(
                state,
                config,
                routes,
                LegRequest::outbound(trip_haul, false),
                rng,
            ) {
                Some(onward) => {
                    day.notes.push(format!(
                        "Multi-stop trip via {} to {}",
                        onward.departure_airport, onward.arrival_airport
                    ));
                    state.record_leg(&onward, config);
                    state.fly(&onward);
                    legs.push(onward);
                }
                None => debug!(
                    "No onward leg from {}; returning directly",
                    state.current_airport
                ),
            }
        }

        if !state.at_base(config) {
            let home = LegSelector::select_leg(state, config, routes, LegRequest::home(trip_haul), rng)
                .or_else(|| ReturnPlanner::plan_return_to_base(state, config, routes, Some(trip_haul)));
            match home {
                Some(leg) => {
                    state.record_leg(&leg, config);
                    state.fly(&leg);
                    legs.push(leg);
                }
                None => {
                    warn!(
                        "No {} haul return route from {} to {}",
                        trip_haul, state.current_airport, config.base_airport
                    );
                    day.notes.push(format!(
                        "No {} haul return route from {} to {}; trip ends away from base",
                        trip_haul, state.current_airport, config.base_airport
                    ));
                    let crossed = Self::commit_trip(state, day, legs, start);
                    return TripOutcome::Stranded { crossed };
                }
            }
        }

        let crossed = Self::commit_trip(state, day, legs, start);
        TripOutcome::Completed { crossed }
    }

    /// Repeats the day's first out-and-back with fresh times. `None` when it no longer
    /// fits inside operating hours.
    fn replay_trip(
        state: &mut GeneratorState,
        config: &ScheduleConfiguration,
        template: &[FlightLeg],
        day: &mut DaySchedule,
    ) -> Option<TripOutcome> {
        let start = (state.current_airport.clone(), state.current_time);
        let mut clock = state.current_time;
        let mut legs = Vec::with_capacity(template.len());
        for leg in template {
            let departure = timing::earliest_departure(clock, config);
            if !timing::instant_within_operating_hours(departure, &config.operating_hours) {
                debug!("Repeated trip no longer fits before curfew");
                return None;
            }
            let retimed = leg.retimed(departure);
            clock = retimed.arrival_time;
            legs.push(retimed);
        }
        for leg in &legs {
            state.record_leg(leg, config);
            state.fly(leg);
        }
        let crossed = Self::commit_trip(state, day, legs, start);
        Some(TripOutcome::Completed { crossed })
    }

    /// Appends the trip's legs departing on the day's date and defers the rest. When
    /// legs are deferred, the position is wound back to the last leg flown today.
    fn commit_trip(
        state: &mut GeneratorState,
        day: &mut DaySchedule,
        legs: Vec<FlightLeg>,
        start: (String, chrono::DateTime<chrono::Utc>),
    ) -> bool {
        let mut crossed = false;
        for leg in legs {
            if !crossed && leg.departure_date() == day.date {
                day.legs.push(leg);
            } else {
                crossed = true;
                debug!(
                    "Deferring {} -> {} departing {}",
                    leg.departure_airport,
                    leg.arrival_airport,
                    leg.departure_time.format("%Y-%m-%d %H:%M")
                );
                state.future_legs.push_back(leg);
            }
        }

        if crossed {
            match day.legs.last() {
                Some(last) if last.departure_date() == day.date => {
                    state.current_airport = last.arrival_airport.clone();
                    state.current_time = last.arrival_time;
                }
                _ => {
                    state.current_airport = start.0;
                    state.current_time = start.1;
                }
            }
        }
        crossed
    }
}
