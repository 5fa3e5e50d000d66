// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog route as delivered by a route provider. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: u64,
    pub departure_iata: String,
    pub arrival_iata: String,
    #[serde(default)]
    pub departure_city: String,
    #[serde(default)]
    pub departure_country: String,
    #[serde(default)]
    pub arrival_city: String,
    #[serde(default)]
    pub arrival_country: String,
    pub duration_min: u32,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub airline_iata: String,
    #[serde(default)]
    pub airline_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HaulType {
    Short,
    Medium,
    Long,
}

impl HaulType {
    pub const ALL: [HaulType; 3] = [HaulType::Short, HaulType::Medium, HaulType::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            HaulType::Short => "short",
            HaulType::Medium => "medium",
            HaulType::Long => "long",
        }
    }
}

impl fmt::Display for HaulType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which haul types may be flown at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaulPreferences {
    #[serde(default)]
    pub short: bool,
    #[serde(default)]
    pub medium: bool,
    #[serde(default)]
    pub long: bool,
}

impl HaulPreferences {
    pub fn all() -> Self {
        Self {
            short: true,
            medium: true,
            long: true,
        }
    }

    pub fn only(haul: HaulType) -> Self {
        Self {
            short: haul == HaulType::Short,
            medium: haul == HaulType::Medium,
            long: haul == HaulType::Long,
        }
    }

    pub fn allows(&self, haul: HaulType) -> bool {
        match haul {
            HaulType::Short => self.short,
            HaulType::Medium => self.medium,
            HaulType::Long => self.long,
        }
    }

    pub fn allowed(&self) -> Vec<HaulType> {
        HaulType::ALL
            .into_iter()
            .filter(|h| self.allows(*h))
            .collect()
    }
}

impl Default for HaulPreferences {
    fn default() -> Self {
        Self::all()
    }
}

/// Relative selection weights for the day's haul type draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaulWeighting {
    #[serde(default = "default_weight")]
    pub short: f64,
    #[serde(default = "default_weight")]
    pub medium: f64,
    #[serde(default = "default_weight")]
    pub long: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl HaulWeighting {
    pub fn weight(&self, haul: HaulType) -> f64 {
        match haul {
            HaulType::Short => self.short,
            HaulType::Medium => self.medium,
            HaulType::Long => self.long,
        }
    }
}

impl Default for HaulWeighting {
    fn default() -> Self {
        Self {
            short: 1.0,
            medium: 1.0,
            long: 1.0,
        }
    }
}

/// Daily curfew window, expressed as local time of day. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl OperatingHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_default(),
        }
    }
}

/// `"HH:MM"` (de)serialization for operating-hours bounds.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfiguration {
    pub airline_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_iata: Option<String>,
    pub base_airport: String,
    pub days: u32,
    #[serde(default)]
    pub haul_preferences: HaulPreferences,
    #[serde(default)]
    pub haul_weighting: HaulWeighting,
    /// Probability that a fresh trip is a plain out-and-back rather than a multi-stop trip.
    #[serde(default = "default_single_destination_ratio")]
    pub single_destination_ratio: f64,
    #[serde(default)]
    pub operating_hours: OperatingHours,
    #[serde(default = "default_turnaround")]
    pub turnaround_minutes: u32,
    #[serde(default)]
    pub preferred_countries: Vec<String>,
    #[serde(default)]
    pub preferred_regions: Vec<String>,
    #[serde(default = "default_rest_hours")]
    pub minimum_rest_hours_between_long_haul: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_repetition_bias: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_mode: Option<bool>,
}

fn default_single_destination_ratio() -> f64 {
    0.5
}

fn default_turnaround() -> u32 {
    45
}

fn default_rest_hours() -> u32 {
    12
}

impl Default for ScheduleConfiguration {
    fn default() -> Self {
        Self {
            airline_name: String::new(),
            airline_iata: None,
            base_airport: String::new(),
            days: 1,
            haul_preferences: HaulPreferences::default(),
            haul_weighting: HaulWeighting::default(),
            single_destination_ratio: default_single_destination_ratio(),
            operating_hours: OperatingHours::default(),
            turnaround_minutes: default_turnaround(),
            preferred_countries: Vec::new(),
            preferred_regions: Vec::new(),
            minimum_rest_hours_between_long_haul: default_rest_hours(),
            destination_repetition_bias: None,
            repetition_mode: None,
        }
    }
}

impl ScheduleConfiguration {
    /// Repetition-bias coefficient, 0.0 when unset.
    pub fn repetition_bias(&self) -> f64 {
        self.destination_repetition_bias.unwrap_or(0.0)
    }

    /// Strict repetition: only already-preferred destinations may be drawn.
    pub fn strict_repetition(&self) -> bool {
        (self.repetition_bias() - 1.0).abs() < f64::EPSILON
    }

    pub fn repetition_mode(&self) -> bool {
        self.repetition_mode.unwrap_or(false)
    }

    /// Identifier passed to route providers: the IATA code when known, else the name.
    pub fn airline_key(&self) -> &str {
        match self.airline_iata.as_deref() {
            Some(code) if !code.trim().is_empty() => code,
            _ => &self.airline_name,
        }
    }
}

/// One scheduled flight with concrete instants. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub haul_type: HaulType,
    pub duration_min: u32,
    pub route_id: u64,
    pub departure_city: String,
    pub departure_country: String,
    pub arrival_city: String,
    pub arrival_country: String,
    pub airline_iata: String,
    pub airline_name: String,
    pub distance_km: f64,
}

impl FlightLeg {
    /// Builds a leg for `route` departing at `departure`. The airline fields always carry
    /// the configured carrier, not the route's operator.
    pub fn from_route(
        route: &Route,
        haul_type: HaulType,
        departure: DateTime<Utc>,
        config: &ScheduleConfiguration,
    ) -> Self {
        Self {
            departure_airport: route.departure_iata.clone(),
            arrival_airport: route.arrival_iata.clone(),
            departure_time: departure,
            arrival_time: crate::timing::arrival_time(departure, route.duration_min),
            haul_type,
            duration_min: route.duration_min,
            route_id: route.id,
            departure_city: route.departure_city.clone(),
            departure_country: route.departure_country.clone(),
            arrival_city: route.arrival_city.clone(),
            arrival_country: route.arrival_country.clone(),
            airline_iata: config.airline_iata.clone().unwrap_or_default(),
            airline_name: config.airline_name.clone(),
            distance_km: route.distance_km,
        }
    }

    /// Same leg moved to a new departure instant.
    pub fn retimed(&self, departure: DateTime<Utc>) -> Self {
        Self {
            departure_time: departure,
            arrival_time: crate::timing::arrival_time(departure, self.duration_min),
            ..self.clone()
        }
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_time.date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: u32,
    pub date: NaiveDate,
    pub legs: Vec<FlightLeg>,
    pub overnight_location: String,
    pub notes: Vec<String>,
}

impl DaySchedule {
    pub fn new(day: u32, date: NaiveDate, overnight_location: impl Into<String>) -> Self {
        Self {
            day,
            date,
            legs: Vec::new(),
            overnight_location: overnight_location.into(),
            notes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub config: ScheduleConfiguration,
    pub days: Vec<DaySchedule>,
}

impl GeneratedSchedule {
    pub fn legs(&self) -> impl Iterator<Item = &FlightLeg> {
        self.days.iter().flat_map(|d| d.legs.iter())
    }
}
