// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::model::{DaySchedule, FlightLeg, OperatingHours, ScheduleConfiguration};
use crate::timing;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet, VecDeque};

/// All mutable data of a single generation run. Created per call, never shared.
#[derive(Debug, Clone)]
pub struct GeneratorState {
    pub current_airport: String,
    /// Calendar date of the day currently being built.
    pub current_date: NaiveDate,
    pub current_time: DateTime<Utc>,
    pub visited_routes: HashSet<u64>,
    pub visited_airports: HashMap<String, u32>,
    pub long_haul_blocked_until: Option<DateTime<Utc>>,
    pub preferred_airports: HashSet<String>,
    pub consecutive_days_away_from_base: u32,
    pub days: Vec<DaySchedule>,
    /// Legs planned while building an earlier day that depart on a later date.
    pub future_legs: VecDeque<FlightLeg>,
}

impl GeneratorState {
    pub fn new(config: &ScheduleConfiguration, start_date: NaiveDate) -> Self {
        let mut visited_airports = HashMap::new();
        visited_airports.insert(config.base_airport.clone(), 1);
        Self {
            current_airport: config.base_airport.clone(),
            current_date: start_date,
            current_time: timing::day_start(start_date, &config.operating_hours),
            visited_routes: HashSet::new(),
            visited_airports,
            long_haul_blocked_until: None,
            preferred_airports: HashSet::new(),
            consecutive_days_away_from_base: 0,
            days: Vec::new(),
            future_legs: VecDeque::new(),
        }
    }

    pub fn at_base(&self, config: &ScheduleConfiguration) -> bool {
        self.current_airport == config.base_airport
    }

    pub fn long_haul_blocked(&self) -> bool {
        self.long_haul_blocked_until
            .is_some_and(|until| self.current_time < until)
    }

    pub fn visits(&self, airport: &str) -> u32 {
        self.visited_airports.get(airport).copied().unwrap_or(0)
    }

    /// Books a planned leg: counts the arrival visit and, outside repetition mode,
    /// consumes the route.
    pub fn record_leg(&mut self, leg: &FlightLeg, config: &ScheduleConfiguration) {
        if !config.repetition_mode() {
            self.visited_routes.insert(leg.route_id);
        }
        *self
            .visited_airports
            .entry(leg.arrival_airport.clone())
            .or_insert(0) += 1;
    }

    /// Moves the aircraft to the end of `leg`.
    pub fn fly(&mut self, leg: &FlightLeg) {
        self.current_airport = leg.arrival_airport.clone();
        self.current_time = leg.arrival_time;
    }

    /// Removes and returns the leading pending legs departing on or before `date`.
    /// Later legs stay queued in order.
    pub fn take_future_legs_for(&mut self, date: NaiveDate) -> Vec<FlightLeg> {
        let mut taken = Vec::new();
        while self
            .future_legs
            .front()
            .is_some_and(|leg| leg.departure_date() <= date)
        {
            if let Some(leg) = self.future_legs.pop_front() {
                taken.push(leg);
            }
        }
        taken
    }

    pub fn drain_future_legs(&mut self) -> Vec<FlightLeg> {
        self.future_legs.drain(..).collect()
    }

    /// Advances to the next calendar date and resets the clock to opening time,
    /// unless a late arrival already carries the clock past it.
    pub fn start_next_day(&mut self, hours: &OperatingHours) {
        self.current_date = self.current_date.succ_opt().unwrap_or(self.current_date);
        let opening = timing::day_start(self.current_date, hours);
        if self.current_time < opening {
            self.current_time = opening;
        }
    }

    /// Day-end bookkeeping of nights away from base.
    pub fn close_day(&mut self, config: &ScheduleConfiguration) {
        if self.at_base(config) {
            self.consecutive_days_away_from_base = 0;
        } else {
            self.consecutive_days_away_from_base += 1;
        }
    }
}
