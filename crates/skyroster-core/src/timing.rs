// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Curfew and clock arithmetic. Every function here is pure.

use crate::model::{OperatingHours, Route, ScheduleConfiguration};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

/// A direct route home together with the instant it can depart.
#[derive(Debug, Clone, Copy)]
pub struct ReturnFlight<'a> {
    pub route: &'a Route,
    pub departure: DateTime<Utc>,
}

fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Time-of-day membership in `[start, end]`, both inclusive. The date is ignored.
pub fn is_within_operating_hours(time: NaiveTime, hours: &OperatingHours) -> bool {
    let m = minutes_of_day(time);
    m >= minutes_of_day(hours.start) && m <= minutes_of_day(hours.end)
}

pub fn instant_within_operating_hours(instant: DateTime<Utc>, hours: &OperatingHours) -> bool {
    is_within_operating_hours(instant.time(), hours)
}

/// `instant` moved forward by `delta`, saturating at the latest representable instant.
pub fn saturating_add(instant: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    instant
        .checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn arrival_time(departure: DateTime<Utc>, duration_min: u32) -> DateTime<Utc> {
    saturating_add(departure, Duration::minutes(i64::from(duration_min)))
}

/// Earliest departure after a turnaround at the current position.
pub fn earliest_departure(current_time: DateTime<Utc>, config: &ScheduleConfiguration) -> DateTime<Utc> {
    saturating_add(current_time, Duration::minutes(i64::from(config.turnaround_minutes)))
}

pub fn at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}

/// Operating-hours opening on `date`.
pub fn day_start(date: NaiveDate, hours: &OperatingHours) -> DateTime<Utc> {
    at(date, hours.start)
}

/// The next instant operations open: later the same date when `instant` is before
/// opening, otherwise the following date.
pub fn next_opening(instant: DateTime<Utc>, hours: &OperatingHours) -> DateTime<Utc> {
    let date = instant.date_naive();
    if minutes_of_day(instant.time()) < minutes_of_day(hours.start) {
        day_start(date, hours)
    } else {
        day_start(date.succ_opt().unwrap_or(date), hours)
    }
}

fn direct_routes<'a>(
    routes: &'a [&'a Route],
    current_airport: &'a str,
    base: &'a str,
) -> impl Iterator<Item = &'a Route> + 'a {
    routes
        .iter()
        .copied()
        .filter(move |r| r.departure_iata == current_airport && r.arrival_iata == base)
}

/// Whether a direct flight home can leave after turnaround inside operating hours and
/// land on the same calendar day as `current_time`.
pub fn is_return_feasible(
    current_time: DateTime<Utc>,
    current_airport: &str,
    base: &str,
    routes: &[&Route],
    config: &ScheduleConfiguration,
) -> bool {
    let departure = earliest_departure(current_time, config);
    if !instant_within_operating_hours(departure, &config.operating_hours) {
        return false;
    }
    let today = current_time.date_naive();
    direct_routes(routes, current_airport, base)
        .any(|r| arrival_time(departure, r.duration_min).date_naive() == today)
}

/// Shortest direct flight home at the earliest feasible departure. A departure that
/// would fall outside operating hours rolls forward to the next opening.
pub fn find_earliest_return_flight<'a>(
    current_time: DateTime<Utc>,
    current_airport: &str,
    base: &str,
    routes: &[&'a Route],
    config: &ScheduleConfiguration,
) -> Option<ReturnFlight<'a>> {
    let mut departure = earliest_departure(current_time, config);
    if !instant_within_operating_hours(departure, &config.operating_hours) {
        departure = next_opening(departure, &config.operating_hours);
    }

    routes
        .iter()
        .copied()
        .filter(|r| r.departure_iata == current_airport && r.arrival_iata == base)
        .min_by_key(|r| r.duration_min)
        .map(|route| ReturnFlight { route, departure })
}
