use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info};

use crate::{
    error::{CommandError, EngineError},
    rng::{RngManager, SystemRng},
    snapshot::SnapshotWriter,
    world::{cycle_day_of, day_of, Notification, SkippedAircraft, World},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    /// Simulated seconds per wall-clock second.
    pub speed: f64,
    /// Longest simulated slice handed to the systems in one step.
    pub max_step_hours: f64,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            speed: self.settings.speed,
            settings: self.settings,
            tick: 0,
            started: false,
            paused: false,
            fault: None,
        }
    }
}

/// Totals over every step taken by one `tick` or `advance_hours` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    pub steps: u64,
    pub hours: f64,
    pub departures: usize,
    pub landings: usize,
    pub skipped: Vec<SkippedAircraft>,
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
    speed: f64,
    tick: u64,
    started: bool,
    paused: bool,
    fault: Option<String>,
}

impl Engine {
    /// Lets every system seed its part of the world. Runs once; later calls
    /// are no-ops.
    pub fn start(&mut self, world: &mut World) -> Result<(), EngineError> {
        if self.started {
            return Ok(());
        }
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            if let Err(err) = system.start(world, &mut rng_stream) {
                let message = format!("{} failed to start: {err:#}", system.name());
                return Err(halt(&mut self.paused, &mut self.fault, world, message));
            }
        }
        self.started = true;
        Ok(())
    }

    /// Converts wall-clock seconds into simulated time at the current speed.
    /// Does nothing while paused.
    pub fn tick(&mut self, world: &mut World, wall_seconds: f64) -> Result<TickSummary, EngineError> {
        if let Some(message) = &self.fault {
            return Err(EngineError::Halted(message.clone()));
        }
        if self.paused || !(wall_seconds > 0.0) {
            return Ok(TickSummary::default());
        }
        self.advance_hours(world, wall_seconds * self.speed / 3600.0)
    }

    /// Advances the clock by `hours` of simulated time in bounded steps.
    pub fn advance_hours(&mut self, world: &mut World, hours: f64) -> Result<TickSummary, EngineError> {
        if let Some(message) = &self.fault {
            return Err(EngineError::Halted(message.clone()));
        }
        self.start(world)?;
        let max_step = self.settings.max_step_hours.clamp(1.0 / 3600.0, 24.0);
        let mut summary = TickSummary::default();
        let mut remaining = if hours.is_finite() { hours } else { 0.0 };
        while remaining > 1e-9 {
            let dt = remaining.min(max_step);
            let stepped = self.step(world, dt);
            let report = std::mem::take(&mut world.tick_report);
            stepped?;
            remaining -= dt;
            summary.steps += 1;
            summary.hours += dt;
            summary.departures += report.departures;
            summary.landings += report.landings;
            summary.skipped.extend(report.skipped);
            if std::mem::take(&mut world.pause_requested) {
                info!(day = world.day(), "paused at week start");
                self.paused = true;
                break;
            }
        }
        Ok(summary)
    }

    /// Runs flat out until the clock reaches `target_hours`. Each week-start
    /// pause hands control to `on_pause` and then resumes.
    pub fn run_until(
        &mut self,
        world: &mut World,
        target_hours: f64,
        mut on_pause: impl FnMut(&Engine, &mut World),
    ) -> Result<TickSummary, EngineError> {
        let mut total = TickSummary::default();
        while world.time_hours() < target_hours - 1e-9 {
            let remaining = target_hours - world.time_hours();
            let summary = self.advance_hours(world, remaining)?;
            total.steps += summary.steps;
            total.hours += summary.hours;
            total.departures += summary.departures;
            total.landings += summary.landings;
            total.skipped.extend(summary.skipped);
            if self.paused {
                on_pause(self, world);
                self.resume();
            }
            if summary.steps == 0 {
                break;
            }
        }
        Ok(total)
    }

    fn step(&mut self, world: &mut World, dt_hours: f64) -> Result<(), EngineError> {
        let prev_time = world.time_hours();
        world.advance_time(dt_hours);
        let now = world.time_hours();
        let day = day_of(now);
        let new_day = day != day_of(prev_time);
        let ctx = SystemContext {
            tick: self.tick,
            prev_time,
            now,
            dt_hours,
            day,
            day_of_cycle: cycle_day_of(now),
            new_day,
            new_week: new_day && cycle_day_of(now) == 1,
            scenario_name: &self.settings.scenario_name,
        };
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            if let Err(err) = system.run(&ctx, world, &mut rng_stream) {
                let message = format!("{} failed at {:.2}h: {err:#}", system.name(), now);
                return Err(halt(&mut self.paused, &mut self.fault, world, message));
            }
        }
        self.tick += 1;
        if let Err(err) = self
            .snapshot_writer
            .maybe_write(world, &self.settings.scenario_name, self.tick)
        {
            let message = format!("snapshot at tick {} failed: {err}", self.tick);
            return Err(halt(&mut self.paused, &mut self.fault, world, message));
        }
        Ok(())
    }

    /// Proposes and applies a round-trip schedule. The random source depends
    /// only on the seed, the aircraft and the week, so repeating the call on
    /// unchanged state yields the same schedule.
    pub fn auto_schedule(&self, world: &mut World, aircraft_id: &str) -> Result<usize, CommandError> {
        let mut rng = self
            .rng
            .seeded(&format!("auto-schedule:{aircraft_id}:{}", world.week()));
        world.auto_schedule(aircraft_id, &mut rng)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes ticking and clears any halt.
    pub fn resume(&mut self) {
        if let Some(message) = self.fault.take() {
            info!(%message, "resuming after halt");
        }
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() && speed >= 0.0 {
            self.speed = speed;
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }
}

fn halt(paused: &mut bool, fault: &mut Option<String>, world: &mut World, message: String) -> EngineError {
    error!(%message, "simulation halted");
    *paused = true;
    *fault = Some(message.clone());
    world.notify(Notification::SimulationError {
        message: message.clone(),
    });
    EngineError::Halted(message)
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub prev_time: f64,
    pub now: f64,
    pub dt_hours: f64,
    pub day: u32,
    pub day_of_cycle: u32,
    pub new_day: bool,
    pub new_week: bool,
    pub scenario_name: &'a str,
}

impl SystemContext<'_> {
    /// True when the step crossed `hour` (time of day) on the way to `now`.
    pub fn crossed_hour(&self, hour: f64) -> bool {
        ((self.prev_time - hour) / 24.0).floor() != ((self.now - hour) / 24.0).floor()
    }
}

pub trait System {
    fn name(&self) -> &str;

    fn start(&mut self, _world: &mut World, _rng: &mut SystemRng<'_>) -> Result<()> {
        Ok(())
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
