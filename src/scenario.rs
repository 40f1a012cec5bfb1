use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    config::{Difficulty, LoggingConfig, SimConfig},
    engine::{EngineBuilder, EngineSettings},
    geo::{self, GeoPoint},
    systems::{AiTrafficSystem, BookkeepingSystem, CalendarSystem, FlightOpsSystem},
    world::{AircraftType, DemandProfile, RouteDemand, World},
};

fn default_starting_cash() -> f64 {
    50_000_000.0
}

fn default_start_hour() -> f64 {
    6.0
}

fn default_speed() -> f64 {
    60.0
}

fn default_max_step_minutes() -> f64 {
    5.0
}

fn default_snapshot_interval_ticks() -> u64 {
    288
}

fn default_ai_fleet_size() -> usize {
    3
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,
    #[serde(default = "default_start_hour")]
    pub start_hour: f64,
    /// Simulated seconds per wall-clock second.
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_max_step_minutes")]
    pub max_step_minutes: f64,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    #[serde(default)]
    pub pause_at_week_start: bool,
    #[serde(default = "default_ai_fleet_size")]
    pub ai_fleet_size: usize,
    #[serde(default)]
    pub airline_codes: Vec<String>,
    pub airports: Vec<ScenarioAirport>,
    pub aircraft_types: Vec<AircraftType>,
    pub routes: Vec<ScenarioRoute>,
    #[serde(default)]
    pub fleet: Vec<ScenarioAircraft>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tuning: SimConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioAirport {
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_true")]
    pub radar: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioRoute {
    pub origin: String,
    pub destination: String,
    pub demand: DemandProfile,
    /// Block time in hours; derived from distance when omitted.
    #[serde(default)]
    pub duration_hours: Option<f64>,
    /// Also add the reverse direction with the same demand.
    #[serde(default = "default_true")]
    pub bidirectional: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioAircraft {
    #[serde(rename = "type")]
    pub type_code: String,
    pub base: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Reference data, starting fleet and cash. The AI market is generated
    /// later, when the engine starts.
    pub fn build_world(&self) -> Result<World> {
        let mut world = World::new(
            self.tuning.clone(),
            self.difficulty,
            self.start_hour,
            self.starting_cash,
        );
        for airport in &self.airports {
            let position = GeoPoint::new(airport.lat, airport.lng);
            if !position.is_finite() {
                bail!("airport {} has a non-finite position", airport.code);
            }
            world.add_airport(&airport.code, &airport.name, position, airport.radar);
        }
        for kind in &self.aircraft_types {
            world.add_aircraft_type(kind.clone());
        }

        let reference = &self.tuning.ai.reference_type;
        let speed = world
            .aircraft_type(reference)
            .with_context(|| format!("reference aircraft type {reference} missing from the catalog"))?
            .speed_kts;
        for route in &self.routes {
            let from = world.airport(&route.origin)?.position;
            let to = world.airport(&route.destination)?.position;
            let duration_hours = match route.duration_hours {
                Some(hours) => hours,
                None if speed > 0.0 => geo::distance_nm(from, to) / speed,
                None => bail!("cannot derive a duration for {}-{}", route.origin, route.destination),
            };
            let mut add = |origin: &str, destination: &str| {
                world.add_route(RouteDemand {
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                    demand: route.demand,
                    duration_hours,
                })
            };
            add(&route.origin, &route.destination);
            if route.bidirectional {
                add(&route.destination, &route.origin);
            }
        }

        world.set_airline_codes(self.airline_codes.clone());
        for aircraft in &self.fleet {
            world
                .spawn_player_aircraft(&aircraft.type_code, &aircraft.base, aircraft.name.as_deref())
                .with_context(|| format!("placing starting {} at {}", aircraft.type_code, aircraft.base))?;
        }
        world.refresh_hub_tiers();
        Ok(world)
    }

    pub fn engine_settings(&self, snapshot_dir: impl Into<PathBuf>) -> EngineSettings {
        EngineSettings {
            scenario_name: self.name.clone(),
            seed: self.seed,
            speed: self.speed,
            max_step_hours: self.max_step_minutes / 60.0,
            snapshot_interval_ticks: self.snapshot_interval_ticks,
            snapshot_dir: snapshot_dir.into(),
        }
    }

    /// The standard system pipeline: calendar first so the day's events are
    /// in place before aircraft move, bookkeeping after every landing.
    pub fn engine_builder(&self, snapshot_dir: impl Into<PathBuf>) -> EngineBuilder {
        EngineBuilder::new(self.engine_settings(snapshot_dir))
            .with_system(CalendarSystem::new().pause_at_week_start(self.pause_at_week_start))
            .with_system(FlightOpsSystem::new())
            .with_system(BookkeepingSystem::new())
            .with_system(AiTrafficSystem::new(self.ai_fleet_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: pair
seed: 7
airports:
  - { code: LHR, name: Heathrow, lat: 51.47, lng: -0.4543 }
  - { code: CDG, name: Charles de Gaulle, lat: 49.0097, lng: 2.5479 }
aircraft_types:
  - { code: A320, name: Airbus A320, range_nm: 3300, speed_kts: 470, capacity: 150, cost: 10000000, fuel_per_nm: 8, maintenance_per_nm: 4 }
routes:
  - origin: LHR
    destination: CDG
    demand: { morning: 0.6, afternoon: 0.4, evening: 0.5 }
fleet:
  - { type: A320, base: LHR, name: Spirit of Kent }
"#;

    #[test]
    fn minimal_scenario_takes_defaults() {
        let scenario: Scenario = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(scenario.difficulty, Difficulty::Medium);
        assert_eq!(scenario.speed, 60.0);
        assert_eq!(scenario.tuning.schedule.horizon_hours, 26.0);

        let world = scenario.build_world().unwrap();
        assert_eq!(world.routes().len(), 2);
        let route = world.route("CDG", "LHR").unwrap();
        let expected = world.distance_between("LHR", "CDG").unwrap() / 470.0;
        assert!((route.duration_hours - expected).abs() < 1e-9);
        assert_eq!(world.aircraft("PL-1").unwrap().name, "Spirit of Kent");
        assert_eq!(world.time_hours(), 6.0);
    }

    #[test]
    fn unknown_fleet_base_is_reported() {
        let yaml = MINIMAL.replace("base: LHR", "base: JFK");
        let scenario: Scenario = serde_yaml::from_str(&yaml).unwrap();
        let Err(err) = scenario.build_world() else {
            panic!("a fleet based at an unknown airport was accepted");
        };
        assert!(format!("{err:#}").contains("JFK"));
    }

    #[test]
    fn loader_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScenarioLoader::new(dir.path()).load("absent.yaml").unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }
}
