pub mod analysis;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod geo;
pub mod ids;
pub mod market;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod staff;
pub mod systems;
pub mod world;

#[cfg(test)]
mod test_support;

pub use config::{Difficulty, SimConfig};
pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use error::{CommandError, EngineError, PlanError, SimError};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::World;
