// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::model::{HaulType, ScheduleConfiguration};
use crate::RosterError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub severity: ValidationSeverity,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Critical)
    }

    pub fn critical(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Critical)
    }

    /// Fails with the critical issues when the report is not valid.
    pub fn into_result(self) -> Result<Self, RosterError> {
        if self.is_valid() {
            return Ok(self);
        }
        let critical: Vec<String> = self
            .critical()
            .map(|i| format!("{}: {}", i.field, i.message))
            .collect();
        Err(RosterError::InvalidConfiguration(critical.join("; ")))
    }

    fn push(&mut self, field: &str, severity: ValidationSeverity, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.to_string(),
            severity,
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.field, i.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Checks a configuration before it reaches the generator, which assumes sane input.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &ScheduleConfiguration) -> ValidationReport {
        let mut report = ValidationReport::default();

        Self::check_ranges(config, &mut report);
        Self::check_identity(config, &mut report);
        Self::check_hauls(config, &mut report);

        if config.operating_hours.start >= config.operating_hours.end {
            report.push(
                "operating_hours",
                ValidationSeverity::Critical,
                format!(
                    "start {} must be before end {}",
                    config.operating_hours.start.format("%H:%M"),
                    config.operating_hours.end.format("%H:%M")
                ),
            );
        }

        report
    }

    fn check_ranges(config: &ScheduleConfiguration, report: &mut ValidationReport) {
        use ValidationSeverity::Critical;

        if !(1..=30).contains(&config.days) {
            report.push("days", Critical, format!("{} is outside 1..=30", config.days));
        }
        if !(30..=180).contains(&config.turnaround_minutes) {
            report.push(
                "turnaround_minutes",
                Critical,
                format!("{} is outside 30..=180", config.turnaround_minutes),
            );
        }
        if !(6..=24).contains(&config.minimum_rest_hours_between_long_haul) {
            report.push(
                "minimum_rest_hours_between_long_haul",
                Critical,
                format!(
                    "{} is outside 6..=24",
                    config.minimum_rest_hours_between_long_haul
                ),
            );
        }
        if !(0.0..=1.0).contains(&config.single_destination_ratio) {
            report.push(
                "single_destination_ratio",
                Critical,
                format!("{} is outside [0, 1]", config.single_destination_ratio),
            );
        }
        if let Some(bias) = config.destination_repetition_bias {
            if !(0.0..=1.0).contains(&bias) {
                report.push(
                    "destination_repetition_bias",
                    Critical,
                    format!("{} is outside [0, 1]", bias),
                );
            }
        }
    }

    fn check_identity(config: &ScheduleConfiguration, report: &mut ValidationReport) {
        let base = &config.base_airport;
        if base.len() != 3 || !base.chars().all(|c| c.is_ascii_alphabetic()) {
            report.push(
                "base_airport",
                ValidationSeverity::Critical,
                format!("'{}' is not a 3-letter IATA code", base),
            );
        }

        let has_iata = config
            .airline_iata
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if config.airline_name.trim().is_empty() && !has_iata {
            report.push(
                "airline_name",
                ValidationSeverity::Critical,
                "an airline name or IATA code is required",
            );
        }
    }

    fn check_hauls(config: &ScheduleConfiguration, report: &mut ValidationReport) {
        for haul in HaulType::ALL {
            let w = config.haul_weighting.weight(haul);
            if !w.is_finite() || w < 0.0 {
                report.push(
                    "haul_weighting",
                    ValidationSeverity::Critical,
                    format!("{} weight {} must be a non-negative number", haul, w),
                );
            }
        }

        let allowed = config.haul_preferences.allowed();
        if allowed.is_empty() {
            report.push(
                "haul_preferences",
                ValidationSeverity::Warning,
                "no haul type enabled; short haul will be used",
            );
        } else if allowed
            .iter()
            .all(|h| config.haul_weighting.weight(*h) == 0.0)
        {
            report.push(
                "haul_weighting",
                ValidationSeverity::Warning,
                "every enabled haul type has zero weight",
            );
        }
    }
}
