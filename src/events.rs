//! Weekly forecasts and the daily resolution of disruptions.

use rand::{seq::SliceRandom, Rng};

use crate::{
    staff::{mitigation, StaffRole},
    world::{EventKind, GameEvent, World, GLOBAL_TARGET},
};

const DEMAND_EVENTS: [EventKind; 3] = [EventKind::Concert, EventKind::Sports, EventKind::Conference];

fn label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Concert => "concert",
        EventKind::Sports => "sports",
        EventKind::Conference => "conference",
        EventKind::Fault => "fault",
        EventKind::Strike => "strike",
        EventKind::Weather => "weather",
        EventKind::FuelPriceChange => "fuel price change",
    }
}

/// Seven days of demand events and weather warnings, probability-scaled by
/// difficulty.
pub fn weekly_forecast(world: &World, rng: &mut impl Rng) -> Vec<GameEvent> {
    let events = &world.config().events;
    let scale = world.difficulty().event_multiplier();
    let airports: Vec<&str> = world.airports().map(|a| a.code.as_str()).collect();
    let mut forecast = Vec::new();

    for day in 1..=7 {
        if rng.gen::<f64>() < events.positive_event_chance * scale {
            if let (Some(&target), Some(&kind)) = (airports.choose(rng), DEMAND_EVENTS.choose(rng)) {
                let value = rng.gen_range(events.positive_multiplier_min..=events.positive_multiplier_max);
                forecast.push(GameEvent {
                    kind,
                    target: target.to_string(),
                    value,
                    day,
                    probability: None,
                    description: format!("Day {day}: a major {} at {target} is boosting demand", label(kind)),
                });
            }
        }
        for &code in &airports {
            if rng.gen::<f64>() < events.weather_warning_chance * scale {
                let probability = rng.gen_range(events.weather_probability_min..=events.weather_probability_max);
                let delay = rng.gen_range(events.weather_delay_min..=events.weather_delay_max);
                forecast.push(GameEvent {
                    kind: EventKind::Weather,
                    target: code.to_string(),
                    value: delay,
                    day,
                    probability: Some(probability),
                    description: format!("Day {day}: bad weather forecast for {code}"),
                });
            }
        }
    }
    forecast
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyResolution {
    pub events: Vec<GameEvent>,
    pub fuel_multiplier: f64,
}

/// Resolves today's forecast entries and rolls the unforeseen disruptions.
pub fn resolve_day(world: &World, day: u32, rng: &mut impl Rng) -> DailyResolution {
    let config = world.config();
    let events = &config.events;
    let staff = &config.staff;
    let scale = world.difficulty().event_multiplier();
    let mut resolved = Vec::new();

    for event in world.forecast().iter().filter(|e| e.day == day) {
        if event.kind != EventKind::Weather {
            resolved.push(event.clone());
            continue;
        }
        if rng.gen::<f64>() >= event.probability.unwrap_or(1.0) {
            continue;
        }
        let factor = world
            .staff()
            .assigned(StaffRole::Dispatcher, &event.target)
            .map_or(1.0, |d| mitigation(staff.weather_delay_reduction, d.level, staff));
        resolved.push(GameEvent {
            value: event.value * factor,
            probability: None,
            description: format!("Weather at {} is delaying departures", event.target),
            ..event.clone()
        });
    }

    let mut fuel_multiplier = 1.0;
    if rng.gen::<f64>() < events.fuel_shock_chance * scale {
        let rising = rng.gen_bool(0.5);
        fuel_multiplier = if rising {
            1.0 + events.fuel_shock_swing
        } else {
            1.0 - events.fuel_shock_swing
        };
        resolved.push(GameEvent {
            kind: EventKind::FuelPriceChange,
            target: GLOBAL_TARGET.to_string(),
            value: fuel_multiplier,
            day,
            probability: None,
            description: format!(
                "Fuel prices are {} {:.0}% today",
                if rising { "up" } else { "down" },
                events.fuel_shock_swing * 100.0
            ),
        });
    }

    let engineers = (1.0 - staff.engineer_fault_reduction * f64::from(world.staff().engineers())).max(0.0);
    for aircraft in world.player_fleet() {
        let pilot = world
            .staff()
            .assigned(StaffRole::Pilot, &aircraft.id)
            .map_or(1.0, |p| mitigation(staff.pilot_fault_reduction, p.level, staff));
        if rng.gen::<f64>() < events.fault_chance * scale * engineers * pilot {
            resolved.push(GameEvent {
                kind: EventKind::Fault,
                target: aircraft.id.clone(),
                value: events.grounding_hours,
                day,
                probability: None,
                description: format!("{} is grounded for maintenance", aircraft.name),
            });
        }
    }

    for airport in world.airports() {
        let dispatcher = world
            .staff()
            .assigned(StaffRole::Dispatcher, &airport.code)
            .map_or(1.0, |d| mitigation(staff.dispatcher_strike_reduction, d.level, staff));
        if rng.gen::<f64>() < events.strike_chance * scale * dispatcher {
            let impact = rng.gen_range(events.strike_impact_min..=events.strike_impact_max);
            resolved.push(GameEvent {
                kind: EventKind::Strike,
                target: airport.code.clone(),
                value: impact,
                day,
                probability: None,
                description: format!("Industrial action at {} is cutting passenger numbers", airport.code),
            });
        }
    }

    DailyResolution {
        events: resolved,
        fuel_multiplier,
    }
}
