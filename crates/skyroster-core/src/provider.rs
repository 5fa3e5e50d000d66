// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::model::Route;
use crate::RosterError;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Source of the route table for one carrier.
pub trait RouteProvider {
    fn get_routes_for_airline(&self, airline_id: &str) -> Result<Vec<Route>, RosterError>;
}

fn matches_airline(route: &Route, airline_id: &str) -> bool {
    let id = airline_id.trim();
    id.is_empty()
        || route.airline_iata.eq_ignore_ascii_case(id)
        || route.airline_name.trim().eq_ignore_ascii_case(id)
}

/// Route table read from a local `.json` or `.csv` file.
#[derive(Debug, Clone)]
pub struct FileRouteProvider {
    path: PathBuf,
}

impl FileRouteProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_all(&self) -> Result<Vec<Route>, RosterError> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => {
                let content = fs::read_to_string(&self.path)?;
                Ok(serde_json::from_str(&content)?)
            }
            "csv" => {
                let mut rdr = csv::ReaderBuilder::new()
                    .trim(csv::Trim::All)
                    .from_path(&self.path)?;
                let mut routes = Vec::new();
                for record in rdr.deserialize() {
                    routes.push(record?);
                }
                Ok(routes)
            }
            other => Err(RosterError::UnknownRouteFormat(other.to_string())),
        }
    }
}

impl RouteProvider for FileRouteProvider {
    fn get_routes_for_airline(&self, airline_id: &str) -> Result<Vec<Route>, RosterError> {
        let routes: Vec<Route> = self
            .load_all()?
            .into_iter()
            .filter(|r| matches_airline(r, airline_id))
            .collect();
        debug!(
            "Loaded {} routes for '{}' from {}",
            routes.len(),
            airline_id,
            self.path.display()
        );
        Ok(routes)
    }
}

/// Remote route catalog (`GET {base_url}/airlines/{id}/routes`) with an in-memory and an
/// on-disk cache per airline.
pub struct CatalogRouteProvider {
    base_url: String,
    cache_dir: PathBuf,
    ttl: Duration,
    memory: Mutex<HashMap<String, Vec<Route>>>,
}

impl CatalogRouteProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_dir: crate::get_config_root().join("routes"),
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            memory: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cache_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cache_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn cache_key(airline_id: &str) -> String {
        airline_id
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }

    pub fn cache_path(&self, airline_id: &str) -> PathBuf {
        self.cache_dir
            .join(format!("routes_{}.json", Self::cache_key(airline_id)))
    }

    /// Cached routes on disk, if present and younger than the TTL.
    fn read_disk_cache(&self, airline_id: &str) -> Option<Vec<Route>> {
        let path = self.cache_path(airline_id);
        let age = fs::metadata(&path).ok()?.modified().ok()?.elapsed().ok()?;
        if age > self.ttl {
            debug!("Route cache expired: {}", path.display());
            return None;
        }
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(routes) => Some(routes),
            Err(e) => {
                warn!("Ignoring unreadable route cache {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_disk_cache(&self, airline_id: &str, routes: &[Route]) -> Result<(), RosterError> {
        fs::create_dir_all(&self.cache_dir)?;
        fs::write(self.cache_path(airline_id), serde_json::to_string(routes)?)?;
        Ok(())
    }

    fn fetch(&self, airline_id: &str) -> Result<Vec<Route>, RosterError> {
        let url = format!("{}/airlines/{}/routes", self.base_url, airline_id.trim());
        info!("Fetching routes from {}", url);
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let response = client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(RosterError::Catalog {
                status: status.as_u16(),
                message,
            });
        }
        let routes: Vec<Route> = response.json()?;
        debug!("Fetched {} routes for {}", routes.len(), airline_id);
        Ok(routes)
    }

    /// Seeds the in-memory cache, bypassing the network.
    pub fn prime(&self, airline_id: &str, routes: Vec<Route>) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(Self::cache_key(airline_id), routes);
        }
    }
}

impl RouteProvider for CatalogRouteProvider {
    fn get_routes_for_airline(&self, airline_id: &str) -> Result<Vec<Route>, RosterError> {
        let key = Self::cache_key(airline_id);
        if let Ok(memory) = self.memory.lock() {
            if let Some(routes) = memory.get(&key) {
                return Ok(routes.clone());
            }
        }

        let routes = match self.read_disk_cache(airline_id) {
            Some(routes) => {
                debug!("Using cached routes for {}", airline_id);
                routes
            }
            None => {
                let routes = self.fetch(airline_id)?;
                if let Err(e) = self.write_disk_cache(airline_id, &routes) {
                    warn!("Could not write route cache for {}: {}", airline_id, e);
                }
                routes
            }
        };

        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key, routes.clone());
        }
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: u64, airline: &str) -> Route {
        Route {
            id,
            departure_iata: "LHR".into(),
            arrival_iata: "CDG".into(),
            departure_city: "London".into(),
            departure_country: "United Kingdom".into(),
            arrival_city: "Paris".into(),
            arrival_country: "France".into(),
            duration_min: 80,
            distance_km: 348.0,
            airline_iata: airline.into(),
            airline_name: format!("{} Airways", airline),
        }
    }

    #[test]
    fn test_cache_key_is_filesystem_safe() {
        assert_eq!(CatalogRouteProvider::cache_key(" ba/x "), "BA_X");
    }

    #[test]
    fn test_matches_airline() {
        let r = route(1, "BA");
        assert!(matches_airline(&r, "ba"));
        assert!(matches_airline(&r, "BA Airways"));
        assert!(matches_airline(&r, ""));
        assert!(!matches_airline(&r, "AF"));
    }

    #[test]
    fn test_primed_memory_cache_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        // Unroutable URL; any network access would fail the test.
        let provider = CatalogRouteProvider::new("http://127.0.0.1:9").with_cache_dir(dir.path());
        provider.prime("BA", vec![route(1, "BA")]);
        let routes = provider.get_routes_for_airline("ba").unwrap();
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_fresh_disk_cache_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CatalogRouteProvider::new("http://127.0.0.1:9").with_cache_dir(dir.path());
        provider
            .write_disk_cache("BA", &[route(1, "BA"), route(2, "BA")])
            .unwrap();
        let routes = provider.get_routes_for_airline("BA").unwrap();
        assert_eq!(routes.len(), 2);
    }
}
