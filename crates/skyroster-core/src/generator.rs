// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::classifier::{RouteClassifier, RoutesByDeparture};
use crate::daily::{DailyScheduler, MAX_NIGHTS_AWAY};
use crate::model::{DaySchedule, GeneratedSchedule, Route, ScheduleConfiguration};
use crate::provider::RouteProvider;
use crate::return_planner::ReturnPlanner;
use crate::state::GeneratorState;
use crate::RosterError;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use rand::Rng;

/// Stateless orchestrator. Every run owns its own [`GeneratorState`], so one generator
/// can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    start_date: Option<NaiveDate>,
}

impl ScheduleGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the first calendar day instead of using today's date.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        config: &ScheduleConfiguration,
        routes: &[Route],
        rng: &mut R,
    ) -> GeneratedSchedule {
        let start_date = self.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let grouped = RouteClassifier::group_by_departure(routes);
        let mut state = GeneratorState::new(config, start_date);

        info!(
            "Generating {}-day schedule for {} from {} ({} routes)",
            config.days,
            config.airline_name,
            config.base_airport,
            routes.len()
        );

        for day_number in 1..=config.days {
            let mut stranded_note = None;
            if state.consecutive_days_away_from_base >= MAX_NIGHTS_AWAY
                && state.future_legs.is_empty()
            {
                if let Some(day) =
                    ReturnPlanner::plan_forced_return(&state, config, &grouped, day_number, None)
                {
                    let day = Self::recover_and_continue(&mut state, config, &grouped, day, rng);
                    state.days.push(day);
                    state.start_next_day(&config.operating_hours);
                    continue;
                }
                warn!(
                    "Day {}: forced return from {} not possible",
                    day_number, state.current_airport
                );
                stranded_note = Some(format!(
                    "Forced return from {} impossible: no direct route to {} on an allowed haul type",
                    state.current_airport, config.base_airport
                ));
            }

            let seed = state.take_future_legs_for(state.current_date);
            let mut day =
                DailyScheduler::plan_day(&mut state, config, &grouped, day_number, seed, rng);
            if let Some(note) = stranded_note {
                day.notes.insert(0, note);
            }
            state.days.push(day);
            state.start_next_day(&config.operating_hours);
        }

        let leftover = state.drain_future_legs();
        if let Some(first) = leftover.first() {
            let day_number = state.days.len() as u32 + 1;
            let mut day = DaySchedule::new(day_number, first.departure_date(), &state.current_airport);
            day.notes.push(format!(
                "{} leg(s) carried over to complete the final trip",
                leftover.len()
            ));
            day.legs = leftover;
            Self::push_flown_day(&mut state, config, day);
            state.start_next_day(&config.operating_hours);
        }

        if !state.at_base(config) {
            let day_number = state.days.len() as u32 + 1;
            match ReturnPlanner::plan_forced_return(&state, config, &grouped, day_number, None) {
                Some(day) => Self::push_flown_day(&mut state, config, day),
                None => warn!(
                    "Schedule ends away from base at {}; no route home",
                    state.current_airport
                ),
            }
        }

        info!(
            "Generated {} day(s), {} leg(s)",
            state.days.len(),
            state.days.iter().map(|d| d.legs.len()).sum::<usize>()
        );

        GeneratedSchedule {
            id: uuid::Uuid::new_v4().to_string(),
            name: format!("{} {}-day schedule", config.airline_name, config.days),
            created_at: Utc::now(),
            config: config.clone(),
            days: state.days,
        }
    }

    /// Flies the forced return, then plans the rest of that day from base.
    fn recover_and_continue<R: Rng + ?Sized>(
        state: &mut GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
        mut day: DaySchedule,
        rng: &mut R,
    ) -> DaySchedule {
        for leg in &day.legs {
            state.record_leg(leg, config);
            state.fly(leg);
        }
        // A return that had to wait for the next opening moves the day with it.
        state.current_date = state.current_date.max(day.date);
        day.date = state.current_date;
        DailyScheduler::continue_day(state, config, routes, day, rng)
    }

    /// Flies every leg of an already assembled day and closes it.
    fn push_flown_day(state: &mut GeneratorState, config: &ScheduleConfiguration, mut day: DaySchedule) {
        for leg in &day.legs {
            state.record_leg(leg, config);
            state.fly(leg);
        }
        day.overnight_location = state.current_airport.clone();
        state.close_day(config);
        state.days.push(day);
    }
}

/// Generates a schedule starting today with thread-local randomness.
pub fn generate(config: &ScheduleConfiguration, routes: &[Route]) -> GeneratedSchedule {
    generate_with_rng(config, routes, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    config: &ScheduleConfiguration,
    routes: &[Route],
    rng: &mut R,
) -> GeneratedSchedule {
    ScheduleGenerator::new().generate(config, routes, rng)
}

/// Fetches the carrier's routes once, then generates. Provider failures are returned
/// unchanged.
pub fn generate_for_airline<P: RouteProvider + ?Sized, R: Rng + ?Sized>(
    provider: &P,
    config: &ScheduleConfiguration,
    rng: &mut R,
) -> Result<GeneratedSchedule, RosterError> {
    let routes = provider.get_routes_for_airline(config.airline_key())?;
    Ok(generate_with_rng(config, &routes, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HaulPreferences, HaulType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn route(id: u64, from: &str, to: &str, minutes: u32) -> Route {
        Route {
            id,
            departure_iata: from.into(),
            arrival_iata: to.into(),
            departure_city: String::new(),
            departure_country: String::new(),
            arrival_city: String::new(),
            arrival_country: String::new(),
            duration_min: minutes,
            distance_km: 0.0,
            airline_iata: "BA".into(),
            airline_name: "British Airways".into(),
        }
    }

    fn config(days: u32) -> ScheduleConfiguration {
        ScheduleConfiguration {
            airline_name: "British Airways".into(),
            airline_iata: Some("BA".into()),
            base_airport: "LHR".into(),
            days,
            haul_preferences: HaulPreferences::only(HaulType::Short),
            ..Default::default()
        }
    }

    #[test]
    fn test_schedule_metadata() {
        let routes = vec![route(1, "LHR", "CDG", 80), route(2, "CDG", "LHR", 85)];
        let schedule = ScheduleGenerator::new()
            .with_start_date(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
            .generate(&config(2), &routes, &mut StdRng::seed_from_u64(9));
        assert_eq!(schedule.name, "British Airways 2-day schedule");
        assert_eq!(schedule.days.len(), 2);
        assert_eq!(schedule.days[0].date, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        assert_eq!(schedule.days[1].date, NaiveDate::from_ymd_opt(2026, 6, 2).unwrap());
        assert_eq!(schedule.config, config(2));
        assert!(uuid::Uuid::parse_str(&schedule.id).is_ok());
    }

    #[test]
    fn test_stranded_run_ends_at_base() {
        // The only route home is long haul, so a short-haul day leaves the aircraft at
        // CDG. The run must still finish at base.
        let routes = vec![route(1, "LHR", "CDG", 80), route(3, "CDG", "LHR", 400)];
        let mut cfg = config(3);
        cfg.haul_preferences = HaulPreferences::all();
        let schedule = ScheduleGenerator::new()
            .with_start_date(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
            .generate(&cfg, &routes, &mut StdRng::seed_from_u64(2));

        assert!(schedule.days.len() >= 3);
        let last = schedule.days.last().unwrap();
        assert_eq!(last.overnight_location, "LHR");
    }

    #[test]
    fn test_recovery_day_keeps_planning_from_base() {
        let routes = RouteClassifier::group_by_departure(&[
            route(2, "CDG", "LHR", 85),
            route(3, "LHR", "AMS", 70),
            route(4, "AMS", "LHR", 75),
        ]);
        let cfg = config(3);
        let mut state = GeneratorState::new(&cfg, NaiveDate::from_ymd_opt(2026, 6, 3).unwrap());
        state.current_airport = "CDG".into();
        state.consecutive_days_away_from_base = 2;

        let forced = ReturnPlanner::plan_forced_return(&state, &cfg, &routes, 3, None).unwrap();
        let day = ScheduleGenerator::recover_and_continue(
            &mut state,
            &cfg,
            &routes,
            forced,
            &mut StdRng::seed_from_u64(4),
        );

        assert!(day.notes[0].contains("Forced return"));
        assert_eq!(day.legs[0].route_id, 2);
        assert!(day.legs.len() >= 3);
        assert_eq!(day.legs[1].departure_airport, "LHR");
        assert_eq!(day.legs[1].arrival_airport, "AMS");
        assert_eq!(day.overnight_location, "LHR");
        assert_eq!(state.consecutive_days_away_from_base, 0);
    }
}
