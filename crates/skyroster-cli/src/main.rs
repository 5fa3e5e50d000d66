// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use skyroster_core::classifier::RouteClassifier;
use skyroster_core::validation::{ConfigValidator, ValidationSeverity};
use skyroster_core::{
    report, CatalogRouteProvider, FileRouteProvider, Route, RouteProvider, ScheduleConfiguration,
    ScheduleGenerator,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit log level; overrides -v
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct RouteSource {
    /// Route table file (.json or .csv); takes precedence over --catalog-url
    #[arg(short, long)]
    routes: Option<PathBuf>,

    /// Base URL of a route catalog service
    #[arg(long, env = "SKYROSTER_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Airline id passed to the provider; defaults to the configured carrier
    #[arg(short, long)]
    airline: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a roster
    Generate {
        /// Schedule configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        #[command(flatten)]
        source: RouteSource,

        /// RNG seed for reproducible rosters
        #[arg(long, env = "SKYROSTER_SEED")]
        seed: Option<u64>,

        /// First calendar day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Write the roster here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check a configuration without generating
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the routes a provider returns, with their haul class
    Routes {
        #[command(flatten)]
        source: RouteSource,
    },
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        self.log_level.unwrap_or(match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
    }
}

fn load_config(path: &Path) -> Result<ScheduleConfiguration> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse configuration {}", path.display()))
}

fn provider(source: &RouteSource) -> Result<Box<dyn RouteProvider>> {
    match (&source.routes, &source.catalog_url) {
        (Some(path), _) => Ok(Box::new(FileRouteProvider::new(path))),
        (None, Some(url)) => Ok(Box::new(CatalogRouteProvider::new(url.as_str()))),
        (None, None) => bail!("No route source. Pass --routes <file> or --catalog-url <url>."),
    }
}

fn load_routes(source: &RouteSource, default_airline: &str) -> Result<Vec<Route>> {
    let airline = source.airline.as_deref().unwrap_or(default_airline);
    provider(source)?
        .get_routes_for_airline(airline)
        .with_context(|| format!("Failed to load routes for '{}'", airline))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = TermLogger::init(
        cli.log_level(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    match &cli.command {
        Commands::Generate {
            config,
            source,
            seed,
            start_date,
            output,
            format,
        } => {
            let config = load_config(config)?;
            let checked = ConfigValidator::validate(&config);
            for issue in checked
                .issues
                .iter()
                .filter(|i| i.severity == ValidationSeverity::Warning)
            {
                log::warn!("{}: {}", issue.field, issue.message);
            }
            checked
                .into_result()
                .with_context(|| "Refusing to generate from an invalid configuration")?;

            let routes = load_routes(source, config.airline_key())?;
            if routes.is_empty() {
                log::warn!("Provider returned no routes for {}", config.airline_key());
            }

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            let mut generator = ScheduleGenerator::new();
            if let Some(date) = start_date {
                generator = generator.with_start_date(*date);
            }
            let schedule = generator.generate(&config, &routes, &mut rng);

            let rendered = match format {
                OutputFormat::Text => report::render_text(&schedule),
                OutputFormat::Json => serde_json::to_string_pretty(&schedule)?,
            };
            match output {
                Some(path) => {
                    fs::write(path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {} day(s) to {}", schedule.days.len(), path.display());
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Validate { config } => {
            let config = load_config(config)?;
            let checked = ConfigValidator::validate(&config);
            if checked.issues.is_empty() {
                println!("Configuration OK");
            }
            for issue in &checked.issues {
                println!("[{:?}] {}: {}", issue.severity, issue.field, issue.message);
            }
            if !checked.is_valid() {
                bail!("{} critical issue(s)", checked.critical().count());
            }
        }
        Commands::Routes { source } => {
            let routes = load_routes(source, "")?;
            for route in &routes {
                println!(
                    "{:>8}  {} → {}  {:>4} min  {:<6}  {}",
                    route.id,
                    route.departure_iata,
                    route.arrival_iata,
                    route.duration_min,
                    RouteClassifier::classify(route.duration_min).as_str(),
                    route.airline_name
                );
            }
            println!("{} route(s)", routes.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_args_parse() {
        let cli = Cli::try_parse_from([
            "skyroster",
            "-vv",
            "generate",
            "--config",
            "ba.json",
            "--routes",
            "routes.csv",
            "--seed",
            "42",
            "--start-date",
            "2026-05-01",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        match cli.command {
            Commands::Generate {
                config,
                source,
                seed,
                start_date,
                format,
                output,
            } => {
                assert_eq!(config, PathBuf::from("ba.json"));
                assert_eq!(source.routes, Some(PathBuf::from("routes.csv")));
                assert_eq!(seed, Some(42));
                assert_eq!(start_date, NaiveDate::from_ymd_opt(2026, 5, 1));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(output, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_log_level_override() {
        let cli =
            Cli::try_parse_from(["skyroster", "--log-level", "error", "validate", "-c", "x.json"])
                .unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Error);
    }

    #[test]
    fn test_routes_file_wins_over_catalog_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        fs::write(
            &path,
            r#"[{"id": 1, "departure_iata": "LHR", "arrival_iata": "CDG", "duration_min": 80, "airline_iata": "BA"}]"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "skyroster",
            "routes",
            "--routes",
            path.to_str().unwrap(),
            "--catalog-url",
            "http://127.0.0.1:9",
        ])
        .unwrap();
        let Commands::Routes { source } = cli.command else {
            panic!("expected routes command");
        };
        assert_eq!(source.catalog_url.as_deref(), Some("http://127.0.0.1:9"));

        let routes = load_routes(&source, "BA").unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].arrival_iata, "CDG");
    }

    #[test]
    fn test_missing_route_source_is_an_error() {
        let source = RouteSource {
            routes: None,
            catalog_url: None,
            airline: None,
        };
        assert!(provider(&source).is_err());
    }
}
