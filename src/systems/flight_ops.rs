use anyhow::Result;
use tracing::{debug, warn};

use crate::{
    engine::{System, SystemContext},
    error::SimError,
    geo,
    market::economics,
    rng::SystemRng,
    staff::{mitigation, StaffRole},
    world::{Aircraft, AircraftStatus, EventKind, FlightLeg, PendingSettlement, SkippedAircraft, World},
};

/// The per-aircraft state machine: grounding, overnight repositioning,
/// departures with weather delays, movement and landing.
pub struct FlightOpsSystem;

impl FlightOpsSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FlightOpsSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct StepOutcome {
    departed_from: Option<String>,
    landed: bool,
    settlement: Option<PendingSettlement>,
    credits: Vec<String>,
}

impl System for FlightOpsSystem {
    fn name(&self) -> &str {
        "flight_ops"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for index in 0..world.aircraft.len() {
            let mut next = world.aircraft[index].clone();
            match advance(world, &mut next, ctx) {
                Ok(outcome) => {
                    world.aircraft[index] = next;
                    if let Some(airport) = outcome.departed_from {
                        world.tick_report.departures += 1;
                        if let Some(dispatcher) = world.staff.assigned(StaffRole::Dispatcher, &airport) {
                            world.staff_credits.push(dispatcher.id.clone());
                        }
                    }
                    if outcome.landed {
                        world.tick_report.landings += 1;
                    }
                    world.pending.extend(outcome.settlement);
                    world.staff_credits.extend(outcome.credits);
                }
                Err(err) => {
                    let aircraft_id = world.aircraft[index].id.clone();
                    warn!(aircraft = %aircraft_id, error = %err, "aircraft skipped this tick");
                    world.tick_report.skipped.push(SkippedAircraft {
                        aircraft_id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn advance(world: &World, ac: &mut Aircraft, ctx: &SystemContext) -> Result<StepOutcome, SimError> {
    let kind = world.aircraft_type(&ac.type_code)?;
    if !ac.position.is_finite() || !ac.progress.is_finite() {
        return Err(SimError::corrupt(&ac.id, "non-finite position or progress"));
    }
    let mut outcome = StepOutcome::default();

    if ac.status == AircraftStatus::Grounded {
        match ac.grounded_until {
            Some(until) if ctx.now > until => {
                ac.status = AircraftStatus::Landed;
                ac.grounded_until = None;
            }
            Some(_) => return Ok(outcome),
            None => return Err(SimError::corrupt(&ac.id, "grounded without a release time")),
        }
    }

    if ac.status == AircraftStatus::Landed {
        let faulted = world
            .daily_events()
            .iter()
            .any(|e| e.kind == EventKind::Fault && e.target == ac.id);
        if faulted && ac.last_fault_day != Some(ctx.day) {
            ac.status = AircraftStatus::Grounded;
            ac.grounded_until = Some(ctx.now + world.config().events.grounding_hours);
            ac.last_fault_day = Some(ctx.day);
            debug!(aircraft = %ac.id, until = ?ac.grounded_until, "grounded by fault");
            return Ok(outcome);
        }

        let reposition_hour = world.config().schedule.reposition_hour;
        if ac.is_player() && ac.location() != ac.home_base && ctx.crossed_hour(reposition_hour) {
            let from = world.airport(ac.location())?;
            let home = world.airport(&ac.home_base)?;
            ac.origin = from.code.clone();
            ac.destination = home.code.clone();
            ac.position = from.position;
            ac.heading = geo::bearing(from.position, home.position).unwrap_or(ac.heading);
            ac.progress = 0.0;
            ac.status = AircraftStatus::Repositioning;
            ac.current_leg = None;
            debug!(aircraft = %ac.id, from = %from.code, "repositioning home");
            return Ok(outcome);
        }

        if let Some(departed) = try_depart(world, ac, ctx, kind.speed_kts)? {
            outcome.departed_from = Some(departed);
        }
    }

    if matches!(ac.status, AircraftStatus::InFlight | AircraftStatus::Repositioning) {
        fly(world, ac, ctx, kind.speed_kts, &mut outcome)?;
    }
    Ok(outcome)
}

/// Starts the leg whose departure window contains the current time of day,
/// or pushes it and every later leg back when weather is holding departures.
fn try_depart(world: &World, ac: &mut Aircraft, ctx: &SystemContext, speed: f64) -> Result<Option<String>, SimError> {
    let schedule = &world.config().schedule;
    let time_of_day = ctx.now.rem_euclid(24.0);
    let mut hours = vec![time_of_day];
    if time_of_day < schedule.reposition_hour {
        hours.push(time_of_day + 24.0);
    }
    let location = ac.location().to_string();
    let found = ac.schedule.iter().enumerate().find_map(|(i, leg)| {
        hours
            .iter()
            .copied()
            .find(|&h| leg.origin == location && leg.in_window(h))
            .map(|h| (i, h))
    });
    let Some((index, hour)) = found else {
        return Ok(None);
    };

    let leg = &ac.schedule[index];
    let weather = world
        .daily_events()
        .iter()
        .find(|e| e.kind == EventKind::Weather && e.target == leg.origin);
    if let (Some(weather), false) = (weather, leg.weather_checked) {
        let staff = &world.config().staff;
        let pilot = world
            .staff()
            .assigned(StaffRole::Pilot, &ac.id)
            .map_or(1.0, |p| mitigation(staff.weather_delay_reduction, p.level, staff));
        let delay = weather.value * pilot;
        ac.schedule[index].weather_checked = true;
        if delay > 0.0 {
            ac.schedule[index].delay += delay;
            propagate_delay(&mut ac.schedule[index..], |d| schedule.turnaround_hours(d), schedule.horizon_hours);
            debug!(aircraft = %ac.id, delay, "weather delay");
            return Ok(None);
        }
    }

    let leg = ac.schedule[index].clone();
    let from = world.airport(&leg.origin)?;
    let to = world.airport(&leg.destination)?;
    let distance = geo::distance_nm(from.position, to.position);
    let elapsed = hour - leg.effective_departure();
    ac.progress = if distance > 0.0 {
        (elapsed * speed / distance).clamp(0.0, 1.0)
    } else {
        1.0
    };
    ac.origin = leg.origin.clone();
    ac.destination = leg.destination.clone();
    ac.position = geo::lerp(from.position, to.position, ac.progress);
    ac.heading = geo::bearing(from.position, to.position).unwrap_or(ac.heading);
    ac.status = AircraftStatus::InFlight;
    ac.current_leg = Some(leg);
    Ok(Some(from.code.clone()))
}

/// Pushes each leg after the first back only as far as the previous leg's
/// delayed arrival plus turnaround requires. Legs that would then land past
/// the horizon are cancelled for the day.
fn propagate_delay(legs: &mut [FlightLeg], turnaround: impl Fn(f64) -> f64, horizon: f64) {
    for i in 0..legs.len() {
        if i > 0 {
            let prev = &legs[i - 1];
            let ready = prev.effective_arrival() + turnaround(prev.duration);
            let leg = &mut legs[i];
            leg.delay = leg.delay.max(ready - leg.departure);
        }
        if legs[i].effective_arrival() > horizon + 1e-9 {
            for later in &mut legs[i..] {
                later.cancelled = true;
            }
            break;
        }
    }
}

fn fly(world: &World, ac: &mut Aircraft, ctx: &SystemContext, speed: f64, outcome: &mut StepOutcome) -> Result<(), SimError> {
    let from = world.airport(&ac.origin)?;
    let to = world.airport(&ac.destination)?;
    let distance = geo::distance_nm(from.position, to.position);
    let progress = if distance > 0.0 {
        ac.progress + speed * ctx.dt_hours / distance
    } else {
        1.0
    };
    if progress < 1.0 {
        let position = geo::lerp(from.position, to.position, progress);
        if let Some(heading) = geo::bearing(ac.position, position) {
            ac.heading = heading;
        }
        ac.position = position;
        ac.progress = progress.max(0.0);
        return Ok(());
    }

    ac.progress = 1.0;
    ac.position = to.position;
    let repositioning = ac.status == AircraftStatus::Repositioning;
    ac.status = AircraftStatus::Landed;
    outcome.landed = true;
    let leg = ac.current_leg.take();
    if !ac.is_player() {
        return Ok(());
    }

    if repositioning {
        let record = economics::settle_reposition(world, ac, &from.code, &to.code, ctx.now)
            .unwrap_or_else(|err| {
                warn!(aircraft = %ac.id, error = %err, "reposition settled as zero cost");
                economics::neutral_record(&from.code, &to.code, ctx.now)
            });
        outcome.settlement = Some(PendingSettlement {
            aircraft_id: ac.id.clone(),
            route_key: crate::world::route_key(&record.origin, &record.destination),
            profit: record.profit,
            satisfaction_delta: None,
            unserved: None,
        });
        ac.history.push(record);
        return Ok(());
    }

    let Some(leg) = leg else {
        return Err(SimError::corrupt(&ac.id, "landed without a leg in progress"));
    };
    let settlement = economics::settle_or_neutral(world, ac, &leg, ctx.now);
    debug!(
        aircraft = %ac.id,
        route = %leg.route_key(),
        passengers = settlement.record.passengers,
        profit = settlement.record.profit,
        "leg completed"
    );
    outcome.settlement = Some(PendingSettlement {
        aircraft_id: ac.id.clone(),
        route_key: leg.route_key(),
        profit: settlement.record.profit,
        satisfaction_delta: Some(settlement.satisfaction_delta),
        unserved: settlement.unserved,
    });
    for role in [StaffRole::Pilot, StaffRole::CabinCrew] {
        if let Some(member) = world.staff().assigned(role, &ac.id) {
            outcome.credits.push(member.id.clone());
        }
    }
    ac.history.push(settlement.record);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_support,
        world::{cycle_day_of, day_of, GameEvent},
    };

    fn step(prev: f64, now: f64) -> SystemContext<'static> {
        SystemContext {
            tick: 0,
            prev_time: prev,
            now,
            dt_hours: now - prev,
            day: day_of(now),
            day_of_cycle: cycle_day_of(now),
            new_day: day_of(now) != day_of(prev),
            new_week: false,
            scenario_name: "tiny",
        }
    }

    fn weather(world: &mut World, airport: &str, hours: f64) {
        world.daily_events_mut().push(GameEvent {
            kind: EventKind::Weather,
            target: airport.into(),
            value: hours,
            day: 1,
            probability: None,
            description: format!("Storms at {airport}"),
        });
    }

    fn park_at(world: &World, airport: &str) -> Aircraft {
        let mut ac = world.aircraft("PL-1").unwrap().clone();
        let position = world.airport(airport).unwrap().position;
        ac.origin = airport.into();
        ac.destination = airport.into();
        ac.position = position;
        ac
    }

    fn out_and_back(first: f64, second: f64) -> Vec<FlightLeg> {
        vec![
            FlightLeg::new("LHR", "CDG", first, 1.0, 1.0),
            FlightLeg::new("CDG", "LHR", second, 1.0, 1.0),
        ]
    }

    #[test]
    fn weather_delay_is_absorbed_by_schedule_slack() {
        let mut world = test_support::tiny_world();
        weather(&mut world, "LHR", 1.0);
        let mut ac = park_at(&world, "LHR");
        ac.schedule = out_and_back(6.0, 12.0);

        let outcome = advance(&world, &mut ac, &step(6.0, 6.05)).unwrap();
        assert!(outcome.departed_from.is_none());
        assert_eq!(ac.status, AircraftStatus::Landed);
        assert_eq!(ac.schedule[0].delay, 1.0);
        assert_eq!(ac.schedule[1].delay, 0.0);

        let outcome = advance(&world, &mut ac, &step(7.0, 7.05)).unwrap();
        assert_eq!(outcome.departed_from.as_deref(), Some("LHR"));
        assert_eq!(ac.status, AircraftStatus::InFlight);
    }

    #[test]
    fn tight_schedule_pushes_the_next_leg_by_the_shortfall() {
        let mut world = test_support::tiny_world();
        weather(&mut world, "LHR", 1.0);
        let mut ac = park_at(&world, "LHR");
        ac.schedule = out_and_back(6.0, 7.75);

        advance(&world, &mut ac, &step(6.0, 6.05)).unwrap();
        assert_eq!(ac.schedule[0].delay, 1.0);
        // Ready at 8.0 + 0.5 turnaround, 0.75h after the planned 7.75.
        assert!((ac.schedule[1].delay - 0.75).abs() < 1e-9);
        assert!(!ac.schedule[1].cancelled);
    }

    #[test]
    fn weather_downstream_still_delays_a_pushed_leg() {
        let mut world = test_support::tiny_world();
        weather(&mut world, "CDG", 1.5);
        let mut ac = park_at(&world, "CDG");
        ac.schedule = out_and_back(6.0, 12.0);
        ac.schedule[0].weather_checked = true;
        ac.schedule[1].delay = 1.0;

        let outcome = advance(&world, &mut ac, &step(13.0, 13.05)).unwrap();
        assert!(outcome.departed_from.is_none());
        assert_eq!(ac.status, AircraftStatus::Landed);
        assert_eq!(ac.schedule[1].delay, 2.5);
        assert!(ac.schedule[1].weather_checked);
    }

    #[test]
    fn legs_pushed_past_the_horizon_are_cancelled() {
        let mut world = test_support::tiny_world();
        weather(&mut world, "LHR", 4.0);
        let mut ac = park_at(&world, "LHR");
        ac.schedule = out_and_back(20.0, 22.0);

        advance(&world, &mut ac, &step(20.0, 20.05)).unwrap();
        assert_eq!(ac.schedule[0].effective_arrival(), 25.0);
        assert!(!ac.schedule[0].cancelled);
        assert!((ac.schedule[1].effective_arrival() - 26.5).abs() < 1e-9);
        assert!(ac.schedule[1].cancelled);
        assert!(!ac.schedule[1].in_window(25.0));
    }

    #[test]
    fn stranded_aircraft_flies_home_at_two_for_cost_only() {
        let world = test_support::tiny_world();
        let mut ac = park_at(&world, "CDG");

        advance(&world, &mut ac, &step(25.95, 26.05)).unwrap();
        assert_eq!(ac.status, AircraftStatus::Repositioning);
        assert_eq!(ac.destination, "LHR");

        let mut now = 26.05;
        let mut settlement = None;
        while settlement.is_none() && now < 30.0 {
            let outcome = advance(&world, &mut ac, &step(now, now + 0.1)).unwrap();
            settlement = outcome.settlement;
            now += 0.1;
        }
        let settlement = settlement.unwrap();
        assert_eq!(settlement.satisfaction_delta, None);
        assert!(settlement.profit < 0.0);
        assert_eq!(ac.status, AircraftStatus::Landed);
        assert_eq!(ac.location(), "LHR");
        let record = ac.history.last().unwrap();
        assert_eq!((record.origin.as_str(), record.destination.as_str()), ("CDG", "LHR"));
        assert_eq!(record.passengers, 0);
        assert_eq!(record.revenue, 0.0);
        assert!(record.cost > 0.0);
    }

    #[test]
    fn progress_stays_in_bounds_across_steps() {
        let world = test_support::tiny_world();
        let mut ac = park_at(&world, "LHR");
        ac.schedule = vec![FlightLeg::new("LHR", "AMS", 6.0, 1.0, 1.0)];

        let mut now = 6.0;
        for _ in 0..20 {
            advance(&world, &mut ac, &step(now, now + 0.07)).unwrap();
            now += 0.07;
            assert!((0.0..=1.0).contains(&ac.progress), "progress {}", ac.progress);
        }
        assert_eq!(ac.status, AircraftStatus::Landed);
        assert_eq!(ac.location(), "AMS");
        assert_eq!(ac.history.len(), 1);
    }
}
