use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aerodynasty::{
    scenario::ScenarioLoader,
    world::{Notification, World},
    Engine,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless airline market simulation")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/europe_small.yaml")]
    scenario: PathBuf,

    /// Simulated hours to run
    #[arg(long, default_value_t = 168.0)]
    hours: f64,

    /// Override the simulated-seconds-per-second multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Override snapshot interval in ticks (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Auto-schedule and lock every player aircraft at the start of each week
    #[arg(long)]
    auto_schedule: bool,

    /// Drive the clock from wall time instead of running flat out
    #[arg(long)]
    realtime: bool,
}

fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

fn plan_week(engine: &Engine, world: &mut World) {
    let ids: Vec<String> = world.player_fleet().map(|ac| ac.id.clone()).collect();
    for id in ids {
        match engine.auto_schedule(world, &id) {
            Ok(legs) => info!(aircraft = %id, legs, "schedule planned"),
            Err(err) => warn!(aircraft = %id, error = %err, "no schedule applied"),
        }
    }
    if let Err(err) = world.lock_schedules() {
        warn!(error = %err, "schedules left unlocked");
    }
}

fn report(world: &mut World) {
    for notification in world.drain_notifications() {
        match notification {
            Notification::WeeklyReport(report) => {
                for route in &report.top_routes {
                    info!(week = report.week, route = %route.route_key, profit = route.profit, "top route");
                }
            }
            Notification::SimulationError { message } => warn!(%message, "simulation error"),
            Notification::DailyEvents { .. } | Notification::WeeklyForecast { .. } => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    init_logging(&scenario.logging.filter);

    if let Some(interval) = cli.snapshot_interval {
        scenario.snapshot_interval_ticks = interval;
    }
    if cli.auto_schedule {
        scenario.pause_at_week_start = true;
    }
    let mut world = scenario.build_world()?;
    let mut engine = scenario.engine_builder(&cli.snapshot_dir).build();
    if let Some(speed) = cli.speed {
        engine.set_speed(speed);
    }
    engine.start(&mut world)?;
    info!(
        scenario = %scenario.name,
        aircraft = world.player_fleet().count(),
        airports = world.airports().count(),
        "scenario loaded"
    );
    if cli.auto_schedule {
        plan_week(&engine, &mut world);
    }

    let target = world.time_hours() + cli.hours.max(0.0);
    if cli.realtime {
        let mut interval = time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = time::Instant::now();
        while world.time_hours() < target {
            tokio::select! {
                _ = interval.tick() => {
                    let now = time::Instant::now();
                    engine.tick(&mut world, now.duration_since(last).as_secs_f64())?;
                    last = now;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted");
                    break;
                }
            }
            if engine.is_paused() {
                if cli.auto_schedule {
                    plan_week(&engine, &mut world);
                }
                engine.resume();
            }
            report(&mut world);
        }
    } else {
        engine.run_until(&mut world, target, |engine, world| {
            report(world);
            if cli.auto_schedule {
                plan_week(engine, world);
            }
        })?;
        report(&mut world);
    }

    println!(
        "Scenario '{}' stopped on day {} after {} ticks. Cash: {:.0}",
        scenario.name,
        world.day(),
        engine.ticks(),
        world.cash()
    );
    Ok(())
}
