mod common;

use aerodynasty::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::{AircraftStatus, Notification, World},
    EngineError,
};
use anyhow::bail;
use tempfile::tempdir;

fn run_week(seed: u64) -> String {
    let mut scenario = common::scenario();
    scenario.seed = seed;
    let temp = tempdir().unwrap();
    let (mut engine, mut world) = common::started(&scenario, temp.path());
    for id in ["PL-1", "PL-2"] {
        engine.auto_schedule(&mut world, id).unwrap();
    }
    world.lock_schedules().unwrap();
    engine.advance_hours(&mut world, 48.0).unwrap();
    serde_json::to_string(&world.snapshot(&scenario.name)).unwrap()
}

#[test]
fn same_seed_gives_identical_worlds() {
    assert_eq!(run_week(11), run_week(11));
}

#[test]
fn engine_emits_snapshots() {
    let mut scenario = common::scenario();
    scenario.snapshot_interval_ticks = 12;
    let temp = tempdir().unwrap();
    let snapshot_dir = temp.path().join("snaps");
    let (mut engine, mut world) = common::started(&scenario, &snapshot_dir);

    engine.advance_hours(&mut world, 2.0).unwrap();
    assert!(engine.ticks() >= 24);

    let expected = snapshot_dir.join("europe_small").join("tick_000012.json");
    assert!(expected.exists(), "expected snapshot {} to exist", expected.display());
    let data = std::fs::read_to_string(expected).unwrap();
    assert!(data.contains("\"scenario\": \"europe_small\""));
    assert!(data.contains("\"tick\": 12"));
}

#[test]
fn week_runs_settle_flights_and_publish_a_report() {
    let scenario = common::scenario();
    let temp = tempdir().unwrap();
    let (mut engine, mut world) = common::started(&scenario, temp.path());
    assert_eq!(world.ai_market().airlines().len(), 4);
    let legs = engine.auto_schedule(&mut world, "PL-1").unwrap();
    assert!(legs >= 2);
    world.lock_schedules().unwrap();

    let summary = engine.advance_hours(&mut world, 170.0).unwrap();
    assert!(summary.departures > 0);
    assert!(summary.landings > 0);
    assert_eq!(world.day(), 8);
    assert!(!world.schedules_locked());

    let history = &world.aircraft("PL-1").unwrap().history;
    assert!(!history.is_empty());
    let report = world.last_report().expect("week 1 closed");
    assert_eq!(report.week, 1);
    assert!(!report.top_routes.is_empty());
    assert!(report.top_routes.len() <= 10);

    let notifications = world.drain_notifications();
    assert!(notifications
        .iter()
        .any(|n| matches!(n, Notification::WeeklyReport(r) if r.week == 1)));
    assert!(notifications
        .iter()
        .any(|n| matches!(n, Notification::WeeklyForecast { week: 2, .. })));
}

#[test]
fn pause_at_week_start_stops_the_clock() {
    let mut scenario = common::quiet_scenario();
    scenario.pause_at_week_start = true;
    let temp = tempdir().unwrap();
    let (mut engine, mut world) = common::started(&scenario, temp.path());

    let summary = engine.advance_hours(&mut world, 200.0).unwrap();
    assert!(engine.is_paused());
    assert!(summary.hours < 200.0);
    assert_eq!(world.day(), 8);
    assert_eq!(world.day_of_cycle(), 1);

    let idle = engine.tick(&mut world, 30.0).unwrap();
    assert_eq!(idle.steps, 0);
    engine.resume();
    let resumed = engine.tick(&mut world, 60.0).unwrap();
    assert!(resumed.steps > 0);
}

#[test]
fn run_until_resumes_after_each_week_start() {
    let mut scenario = common::quiet_scenario();
    scenario.pause_at_week_start = true;
    let temp = tempdir().unwrap();
    let (mut engine, mut world) = common::started(&scenario, temp.path());
    let target = world.time_hours() + 200.0;

    let mut pauses = Vec::new();
    let summary = engine
        .run_until(&mut world, target, |_, world| pauses.push(world.day()))
        .unwrap();
    assert_eq!(pauses, vec![8]);
    assert!(!engine.is_paused());
    assert!((world.time_hours() - target).abs() < 1e-6);
    assert!((summary.hours - 200.0).abs() < 1e-6);
}

#[test]
fn failed_snapshot_halts_the_engine() {
    let mut scenario = common::quiet_scenario();
    scenario.snapshot_interval_ticks = 1;
    let temp = tempdir().unwrap();
    let blocker = temp.path().join("not_a_dir");
    std::fs::write(&blocker, b"").unwrap();
    let (mut engine, mut world) = common::started(&scenario, &blocker);
    engine.auto_schedule(&mut world, "PL-1").unwrap();

    let err = engine.advance_hours(&mut world, 1.0).unwrap_err();
    assert!(matches!(err, EngineError::Halted(ref m) if m.contains("snapshot")));
    assert_eq!(engine.ticks(), 1);
    assert!(engine.is_paused());
    assert!(engine.fault().is_some());
    assert_eq!(world.tick_report().departures, 0);
    assert!(world.tick_report().skipped.is_empty());
    assert!(world
        .drain_notifications()
        .iter()
        .any(|n| matches!(n, Notification::SimulationError { message } if message.contains("snapshot"))));
    assert!(engine.advance_hours(&mut world, 1.0).is_err());
}

struct FailOnce {
    at_tick: u64,
    failed: bool,
}

impl System for FailOnce {
    fn name(&self) -> &str {
        "fail_once"
    }

    fn run(&mut self, ctx: &SystemContext, _world: &mut World, _rng: &mut SystemRng<'_>) -> anyhow::Result<()> {
        if !self.failed && ctx.tick == self.at_tick {
            self.failed = true;
            bail!("ledger out of balance");
        }
        Ok(())
    }
}

#[test]
fn system_failure_halts_until_resumed() {
    let scenario = common::quiet_scenario();
    let temp = tempdir().unwrap();
    let mut world = scenario.build_world().unwrap();
    let mut engine = scenario
        .engine_builder(temp.path())
        .with_system(FailOnce {
            at_tick: 3,
            failed: false,
        })
        .build();

    let err = engine.advance_hours(&mut world, 1.0).unwrap_err();
    assert!(matches!(err, EngineError::Halted(ref m) if m.contains("ledger out of balance")));
    assert!(engine.is_paused());
    assert!(engine.fault().is_some());
    assert!(world
        .drain_notifications()
        .iter()
        .any(|n| matches!(n, Notification::SimulationError { .. })));
    assert!(engine.advance_hours(&mut world, 1.0).is_err());

    engine.resume();
    assert!(engine.fault().is_none());
    engine.advance_hours(&mut world, 1.0).unwrap();
}

#[test]
fn corrupt_aircraft_is_skipped_without_halting() {
    let scenario = common::quiet_scenario();
    let temp = tempdir().unwrap();
    let (mut engine, mut world) = common::started(&scenario, temp.path());
    engine.auto_schedule(&mut world, "PL-2").unwrap();
    world.aircraft_mut("PL-1").unwrap().progress = f64::NAN;

    let summary = engine.advance_hours(&mut world, 1.0).unwrap();
    assert!(engine.fault().is_none());
    assert!(summary.skipped.iter().any(|s| s.aircraft_id == "PL-1"));
    assert!(summary.skipped.iter().all(|s| s.aircraft_id != "PL-2"));
    assert!(summary.departures >= 1);
    let corrupt = world.aircraft("PL-1").unwrap();
    assert!(corrupt.progress.is_nan());
    assert_eq!(corrupt.status, AircraftStatus::Landed);
}
