#![allow(dead_code)]

use std::path::Path;

use aerodynasty::{
    scenario::{Scenario, ScenarioLoader},
    Engine, World,
};

pub fn scenario() -> Scenario {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("scenarios/europe_small.yaml")
        .expect("fixture scenario parses")
}

/// Scenario with every random disruption switched off.
pub fn quiet_scenario() -> Scenario {
    let mut scenario = scenario();
    let events = &mut scenario.tuning.events;
    events.positive_event_chance = 0.0;
    events.weather_warning_chance = 0.0;
    events.fuel_shock_chance = 0.0;
    events.fault_chance = 0.0;
    events.strike_chance = 0.0;
    scenario
}

pub fn started(scenario: &Scenario, snapshot_dir: &Path) -> (Engine, World) {
    let mut world = scenario.build_world().expect("fixture world builds");
    let mut engine = scenario.engine_builder(snapshot_dir).build();
    engine.start(&mut world).expect("engine starts");
    (engine, world)
}
