use anyhow::Result;
use tracing::info;

use crate::{
    analysis,
    engine::{System, SystemContext},
    events,
    rng::SystemRng,
    world::{Notification, World},
};

/// Day and week rollover: wages, disruptions, forecasts and the weekly report.
pub struct CalendarSystem {
    pause_at_week_start: bool,
}

impl CalendarSystem {
    pub fn new() -> Self {
        Self {
            pause_at_week_start: false,
        }
    }

    pub fn pause_at_week_start(mut self, pause: bool) -> Self {
        self.pause_at_week_start = pause;
        self
    }

    fn open_week(&self, world: &mut World, rng: &mut SystemRng<'_>) {
        let week = world.week();
        world.forecast = events::weekly_forecast(world, rng);
        world.schedules_locked = false;
        world.ledger.cash_at_week_start = world.ledger.cash;
        world.ledger.daily_pnl.clear();
        world.ledger.unserved.clear();
        let events = world.forecast.clone();
        world.notify(Notification::WeeklyForecast { week, events });
    }

    fn open_day(&self, world: &mut World, rng: &mut SystemRng<'_>) {
        let day = world.day_of_cycle();
        let resolution = events::resolve_day(world, day, rng);
        world.daily_events = resolution.events;
        world.fuel_multiplier = resolution.fuel_multiplier;
        let events = world.daily_events.clone();
        world.notify(Notification::DailyEvents { day, events });
    }
}

impl Default for CalendarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CalendarSystem {
    fn name(&self) -> &str {
        "calendar"
    }

    fn start(&mut self, world: &mut World, rng: &mut SystemRng<'_>) -> Result<()> {
        self.open_week(world, rng);
        self.open_day(world, rng);
        Ok(())
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if !ctx.new_day {
            return Ok(());
        }

        if ctx.new_week {
            let finished = world.week().saturating_sub(1).max(1);
            let report = analysis::weekly_report(world, finished);
            info!(
                week = finished,
                cash = world.cash(),
                change = world.cash() - world.ledger.cash_at_week_start,
                "week closed"
            );
            world.last_report = Some(report.clone());
            world.notify(Notification::WeeklyReport(report));
            self.open_week(world, rng);
            if self.pause_at_week_start {
                world.pause_requested = true;
            }
        }

        let wages = world.staff.daily_wages(&world.config.staff);
        world.ledger.book(ctx.day_of_cycle, -wages);

        for aircraft in world.aircraft.iter_mut() {
            for leg in aircraft.schedule.iter_mut() {
                leg.delay = 0.0;
                leg.cancelled = false;
                leg.weather_checked = false;
            }
        }

        self.open_day(world, rng);
        info!(
            day = ctx.day,
            cycle_day = ctx.day_of_cycle,
            wages,
            events = world.daily_events.len(),
            fuel = world.fuel_multiplier,
            "new day"
        );
        Ok(())
    }
}
