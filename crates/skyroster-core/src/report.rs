// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::model::{FlightLeg, GeneratedSchedule, HaulType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Aggregate figures over a whole schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub days: usize,
    pub legs: usize,
    pub block_minutes: u64,
    pub distance_km: f64,
    pub legs_by_haul: BTreeMap<HaulType, usize>,
    pub nights_away: usize,
    pub destinations: BTreeSet<String>,
}

pub fn summary(schedule: &GeneratedSchedule) -> ScheduleSummary {
    let base = &schedule.config.base_airport;
    let mut out = ScheduleSummary {
        days: schedule.days.len(),
        ..Default::default()
    };
    for leg in schedule.legs() {
        out.legs += 1;
        out.block_minutes += u64::from(leg.duration_min);
        out.distance_km += leg.distance_km;
        *out.legs_by_haul.entry(leg.haul_type).or_default() += 1;
        if &leg.arrival_airport != base {
            out.destinations.insert(leg.arrival_airport.clone());
        }
    }
    out.nights_away = schedule
        .days
        .iter()
        .filter(|d| &d.overnight_location != base)
        .count();
    out
}

fn leg_line(leg: &FlightLeg) -> String {
    format!(
        "  {} {} → {} {}  {:<6}  {:>3}h{:02}  #{:<8}  {}",
        leg.departure_time.format("%H:%M"),
        leg.departure_airport,
        leg.arrival_airport,
        leg.arrival_time.format("%H:%M"),
        leg.haul_type.as_str(),
        leg.duration_min / 60,
        leg.duration_min % 60,
        leg.route_id,
        leg.airline_name
    )
}

/// Plain-text roster: header, then one block per day.
pub fn render_text(schedule: &GeneratedSchedule) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", schedule.name);
    let _ = writeln!(out, "id: {}", schedule.id);
    let _ = writeln!(
        out,
        "created: {}",
        schedule.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(
        out,
        "base: {}  days: {}",
        schedule.config.base_airport,
        schedule.days.len()
    );

    for day in &schedule.days {
        let _ = writeln!(out);
        let _ = writeln!(out, "Day {} — {}", day.day, day.date.format("%Y-%m-%d"));
        if day.legs.is_empty() {
            let _ = writeln!(out, "  (no flying)");
        }
        for leg in &day.legs {
            let _ = writeln!(out, "{}", leg_line(leg));
        }
        let _ = writeln!(out, "  overnight: {}", day.overnight_location);
        for note in &day.notes {
            let _ = writeln!(out, "    - {}", note);
        }
    }

    let s = summary(schedule);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} leg(s), {}h{:02} block, {:.0} km, {} night(s) away, {} destination(s)",
        s.legs,
        s.block_minutes / 60,
        s.block_minutes % 60,
        s.distance_km,
        s.nights_away,
        s.destinations.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DaySchedule, Route, ScheduleConfiguration};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn leg(id: u64, from: &str, to: &str, minutes: u32, hour: u32) -> FlightLeg {
        let config = ScheduleConfiguration {
            airline_name: "British Airways".into(),
            airline_iata: Some("BA".into()),
            base_airport: "LHR".into(),
            ..Default::default()
        };
        let route = Route {
            id,
            departure_iata: from.into(),
            arrival_iata: to.into(),
            departure_city: String::new(),
            departure_country: String::new(),
            arrival_city: String::new(),
            arrival_country: String::new(),
            duration_min: minutes,
            distance_km: 350.0,
            airline_iata: "BA".into(),
            airline_name: "British Airways".into(),
        };
        let dep = Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap();
        FlightLeg::from_route(&route, HaulType::Short, dep, &config)
    }

    fn schedule() -> GeneratedSchedule {
        let config = ScheduleConfiguration {
            airline_name: "British Airways".into(),
            base_airport: "LHR".into(),
            days: 2,
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut d1 = DaySchedule::new(1, date, "CDG");
        d1.legs.push(leg(1, "LHR", "CDG", 80, 7));
        d1.notes.push("Stranded away from base".into());
        let mut d2 = DaySchedule::new(2, date.succ_opt().unwrap(), "LHR");
        d2.legs.push(leg(2, "CDG", "LHR", 85, 9));
        GeneratedSchedule {
            id: "abc".into(),
            name: "British Airways 2-day schedule".into(),
            created_at: Utc.with_ymd_and_hms(2026, 4, 30, 12, 0, 0).unwrap(),
            config,
            days: vec![d1, d2],
        }
    }

    #[test]
    fn test_summary_totals() {
        let s = summary(&schedule());
        assert_eq!(s.legs, 2);
        assert_eq!(s.block_minutes, 165);
        assert_eq!(s.distance_km, 700.0);
        assert_eq!(s.legs_by_haul.get(&HaulType::Short), Some(&2));
        assert_eq!(s.nights_away, 1);
        assert_eq!(s.destinations.into_iter().collect::<Vec<_>>(), vec!["CDG"]);
    }

    #[test]
    fn test_render_text_layout() {
        let text = render_text(&schedule());
        assert!(text.starts_with("British Airways 2-day schedule\n"));
        assert!(text.contains("Day 1 — 2026-05-01"));
        assert!(text.contains("07:00 LHR → CDG 08:20"));
        assert!(text.contains("  overnight: CDG"));
        assert!(text.contains("    - Stranded away from base"));
        assert!(text.contains("2 leg(s), 2h45 block"));
    }
}
