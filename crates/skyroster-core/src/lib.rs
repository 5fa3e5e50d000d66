// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod bias;
pub mod classifier;
pub mod daily;
pub mod generator;
pub mod model;
pub mod provider;
pub mod report;
pub mod return_planner;
pub mod selector;
pub mod state;
pub mod timing;
pub mod validation;

pub use generator::{generate, generate_for_airline, generate_with_rng, ScheduleGenerator};
pub use model::{
    DaySchedule, FlightLeg, GeneratedSchedule, HaulPreferences, HaulType, HaulWeighting,
    OperatingHours, Route, ScheduleConfiguration,
};
pub use provider::{CatalogRouteProvider, FileRouteProvider, RouteProvider};
pub use state::GeneratorState;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unsupported route file format: {0}")]
    UnknownRouteFormat(String),
    #[error("Route catalog returned {status}: {message}")]
    Catalog { status: u16, message: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Directory used for on-disk caches (route catalog snapshots).
/// Falls back to the working directory when no home directory can be resolved.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "skyroster", "SkyRoster")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
