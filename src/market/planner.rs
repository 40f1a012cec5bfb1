//! Fare optimisation and the randomised round-trip auto-scheduler.
//!
//! Both are pure functions of a `&World`: they propose fares and schedules
//! and leave applying them to the caller.

use std::collections::HashMap;

use rand::Rng;

use crate::{
    config::{EconomyConfig, ScheduleConfig},
    error::{PlanError, SimError},
    market::{
        demand::{self, EventSource},
        economics::LegTerms,
    },
    world::{route_key, Aircraft, AircraftType, EventKind, FlightLeg, TimeBucket, World},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareQuote {
    pub fare: f64,
    pub profit: f64,
    pub boarded: u32,
}

/// Grid search over `[fare_min, fare_max]` in `steps` equal intervals with
/// the unsaturated allocation. The first fare reaching the best profit wins.
pub fn optimal_fare(
    terms: &LegTerms,
    pool: u32,
    crew_bonus: f64,
    schedule: &ScheduleConfig,
    economy: &EconomyConfig,
    steps: u32,
) -> FareQuote {
    let steps = steps.max(1);
    let span = schedule.fare_max - schedule.fare_min;
    let mut best: Option<FareQuote> = None;
    for i in 0..=steps {
        let fare = schedule.fare_min + span * f64::from(i) / f64::from(steps);
        let demand_factor = demand::fare_effect(fare, economy) * crew_bonus;
        let boarded = demand::floor_count(f64::from(pool) * demand_factor).min(terms.capacity);
        let profit = terms.financials(boarded, fare).profit;
        if best.map_or(true, |b| profit > b.profit) {
            best = Some(FareQuote { fare, profit, boarded });
        }
    }
    best.unwrap_or(FareQuote {
        fare: 1.0,
        profit: f64::NEG_INFINITY,
        boarded: 0,
    })
}

/// Passengers a planned leg takes out of its route pool. Cabin crew appeal
/// is left out so the plan does not count on it.
fn planned_load(pool: u32, fare: f64, capacity: u32, economy: &EconomyConfig) -> u32 {
    demand::floor_count(f64::from(pool) * demand::fare_effect(fare, economy)).min(capacity)
}

/// Seats a competing departure is assumed to fill when planning.
fn consumed_by(capacity: u32, load_factor: f64) -> f64 {
    (f64::from(capacity) * load_factor).floor()
}

/// Prices a single leg for manual assignment: forecast pool for today's
/// cycle day, minus the expected load of every competing departure in the
/// window, then the best fare for what is left.
pub fn quote_leg(
    world: &World,
    aircraft: &Aircraft,
    origin: &str,
    destination: &str,
    departure: f64,
    duration: f64,
) -> Result<FareQuote, SimError> {
    let config = world.config();
    let terms = LegTerms::for_leg(world, aircraft, origin, destination, duration)?;
    let route = world.route(origin, destination)?;
    let source = EventSource::Forecast {
        day: world.day_of_cycle(),
    };
    let pool = demand::passenger_pool(world, route, terms.capacity, TimeBucket::from_hour(departure), source)?;
    let rivals = demand::competitors(world, &aircraft.id, origin, destination, departure)?;
    let ai_capacity = world.aircraft_type(&config.ai.reference_type)?.capacity;
    let taken = rivals.len() as f64 * consumed_by(ai_capacity, config.planner.competitor_load_factor);
    let remaining = demand::floor_count(f64::from(pool) - taken);
    Ok(optimal_fare(
        &terms,
        remaining,
        demand::crew_bonus(world, &aircraft.id),
        &config.schedule,
        &config.economy,
        config.planner.fare_steps,
    ))
}

/// Mean daily pool per route over the seven forecast days, each day being
/// the floored mean of its three time buckets.
pub fn weekly_pools(world: &World, sizing: &AircraftType) -> Result<HashMap<String, f64>, SimError> {
    let mut pools = HashMap::new();
    for route in world.routes() {
        let mut total = 0.0;
        for day in 1..=7 {
            let source = EventSource::Forecast { day };
            let mut buckets = 0u64;
            for bucket in [TimeBucket::Morning, TimeBucket::Afternoon, TimeBucket::Evening] {
                buckets += u64::from(demand::passenger_pool(world, route, sizing.capacity, bucket, source)?);
            }
            total += (buckets / 3) as f64;
        }
        pools.insert(route.key(), total / 7.0);
    }
    Ok(pools)
}

/// Weekly pools less the expected load of every AI leg and every other
/// player leg on the same route.
pub fn contention_adjusted_pools(world: &World, aircraft_id: &str, sizing: &AircraftType) -> Result<HashMap<String, f64>, SimError> {
    let config = world.config();
    let load = config.planner.competitor_load_factor;
    let mut pools = weekly_pools(world, sizing)?;
    let mut consume = |key: String, capacity: u32| {
        if let Some(pool) = pools.get_mut(&key) {
            if *pool > 0.0 {
                *pool = (*pool - consumed_by(capacity, load)).max(0.0);
            }
        }
    };

    let ai_capacity = world.aircraft_type(&config.ai.reference_type)?.capacity;
    for (_, leg) in world.ai_market().legs() {
        consume(leg.route_key(), ai_capacity);
    }
    for other in world.player_fleet().filter(|ac| ac.id != aircraft_id) {
        let Ok(kind) = world.aircraft_type(&other.type_code) else {
            continue;
        };
        for leg in &other.schedule {
            consume(leg.route_key(), kind.capacity);
        }
    }
    Ok(pools)
}

struct Candidate {
    leg: FlightLeg,
    score: f64,
    boarded: u32,
}

/// Builds the longest round trip from the aircraft's home base that the
/// randomised greedy search can find.
pub fn plan_round_trip(world: &World, aircraft_id: &str, rng: &mut impl Rng) -> Result<Vec<FlightLeg>, PlanError> {
    let config = world.config();
    let aircraft = world.aircraft(aircraft_id)?;
    let kind = world.aircraft_type(&aircraft.type_code)?;
    if kind.speed_kts <= 0.0 || !kind.speed_kts.is_finite() {
        return Err(SimError::corrupt(&kind.code, "non-positive cruise speed").into());
    }
    let adjusted = contention_adjusted_pools(world, aircraft_id, kind)?;
    let crew = demand::crew_bonus(world, aircraft_id);
    let home = aircraft.home_base.as_str();

    let mut best: Vec<FlightLeg> = Vec::new();
    for attempt in 0..config.planner.attempts {
        let mut pools = adjusted.clone();
        let mut legs: Vec<FlightLeg> = Vec::new();
        let mut clock = config.schedule.day_start_hour;
        let mut at = home.to_string();
        let mut previous: Option<String> = None;

        loop {
            let mut candidates = Vec::new();
            for route in world.routes_from(&at) {
                if previous.as_deref() == Some(route.destination.as_str()) {
                    continue;
                }
                let remaining = pools.get(&route.key()).copied().unwrap_or(0.0);
                if remaining <= f64::from(kind.capacity) * config.planner.min_pool_share {
                    continue;
                }
                let distance = world.distance_between(&route.origin, &route.destination)?;
                let duration = distance / kind.speed_kts;
                if distance > kind.range_nm || clock + duration > config.schedule.horizon_hours {
                    continue;
                }
                let terms = LegTerms::for_leg(world, aircraft, &route.origin, &route.destination, duration)?;
                let available = demand::floor_count(remaining);
                let quote = optimal_fare(
                    &terms,
                    available,
                    crew,
                    &config.schedule,
                    &config.economy,
                    config.planner.fare_steps,
                );
                let warned = world
                    .forecast()
                    .iter()
                    .any(|e| e.kind == EventKind::Weather && e.target == route.destination);
                let score = if warned {
                    quote.profit - config.planner.weather_penalty * quote.profit.abs()
                } else {
                    quote.profit
                };
                if score > config.planner.min_leg_score {
                    candidates.push(Candidate {
                        leg: FlightLeg::new(&route.origin, &route.destination, clock, duration, quote.fare),
                        score,
                        boarded: planned_load(available, quote.fare, kind.capacity, &config.economy),
                    });
                }
            }
            if candidates.is_empty() {
                break;
            }
            candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
            let index = if attempt < config.planner.greedy_attempts {
                0
            } else {
                rng.gen_range(0..candidates.len().min(config.planner.top_candidates.max(1)))
            };
            let chosen = candidates.swap_remove(index);
            let key = chosen.leg.route_key();
            if let Some(pool) = pools.get_mut(&key) {
                *pool = (*pool - f64::from(chosen.boarded)).max(0.0);
            }
            clock = chosen.leg.arrival + config.schedule.turnaround_hours(chosen.leg.duration);
            previous = Some(at);
            at = chosen.leg.destination.clone();
            legs.push(chosen.leg);
        }

        if at != home && !legs.is_empty() {
            if let Some(leg) = return_leg(world, aircraft, kind, &at, clock, &pools, crew)? {
                legs.push(leg);
            }
        }
        let closes = legs.last().is_some_and(|leg| leg.destination == home);
        if closes && legs.len() > best.len() {
            best = legs;
        }
    }

    if best.is_empty() {
        return Err(PlanError::NoRoundTrip {
            aircraft: aircraft_id.to_string(),
            home: home.to_string(),
        });
    }
    Ok(best)
}

fn return_leg(
    world: &World,
    aircraft: &Aircraft,
    kind: &AircraftType,
    from: &str,
    departure: f64,
    pools: &HashMap<String, f64>,
    crew: f64,
) -> Result<Option<FlightLeg>, SimError> {
    let config = world.config();
    let home = aircraft.home_base.as_str();
    if world.route(from, home).is_err() {
        return Ok(None);
    }
    let distance = world.distance_between(from, home)?;
    let duration = distance / kind.speed_kts;
    if distance > kind.range_nm || departure + duration > config.schedule.horizon_hours {
        return Ok(None);
    }
    let terms = LegTerms::for_leg(world, aircraft, from, home, duration)?;
    let remaining = pools.get(&route_key(from, home)).copied().unwrap_or(0.0);
    let quote = optimal_fare(
        &terms,
        demand::floor_count(remaining),
        crew,
        &config.schedule,
        &config.economy,
        config.planner.fare_steps,
    );
    Ok(Some(FlightLeg::new(from, home, departure, duration, quote.fare)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn terms() -> LegTerms {
        let world = crate::test_support::tiny_world();
        let aircraft = world.aircraft("PL-1").unwrap();
        LegTerms::for_leg(&world, aircraft, "LHR", "CDG", 0.5).unwrap()
    }

    #[test]
    fn optimizer_prefers_lowest_fare_on_ties() {
        let t = terms();
        let quote = optimal_fare(&t, 0, 1.0, &ScheduleConfig::default(), &EconomyConfig::default(), 40);
        assert!((quote.fare - 0.8).abs() < 1e-12);
        assert_eq!(quote.boarded, 0);
    }

    #[test]
    fn optimizer_raises_fares_on_scarce_seats() {
        let t = terms();
        let quote = optimal_fare(&t, 1_000, 1.0, &ScheduleConfig::default(), &EconomyConfig::default(), 40);
        assert!((quote.fare - 1.2).abs() < 1e-9);
        assert_eq!(quote.boarded, 150);
    }

    #[test]
    fn planned_load_ignores_cabin_crew() {
        let t = terms();
        let economy = EconomyConfig::default();
        let quote = optimal_fare(&t, 100, 1.3, &ScheduleConfig::default(), &economy, 40);
        let load = planned_load(100, quote.fare, t.capacity, &economy);
        assert_eq!(load, demand::floor_count(100.0 * demand::fare_effect(quote.fare, &economy)));
        assert!(load < quote.boarded);
        assert_eq!(planned_load(100, 1.0, 150, &economy), 100);
        assert_eq!(planned_load(1_000, 1.0, 150, &economy), 150);
    }

    proptest! {
        #[test]
        fn finer_grid_never_loses_profit(pool in 0u32..600, crew in 1.0f64..1.5, steps in 1u32..60) {
            let t = terms();
            let schedule = ScheduleConfig::default();
            let economy = EconomyConfig::default();
            let coarse = optimal_fare(&t, pool, crew, &schedule, &economy, steps);
            let fine = optimal_fare(&t, pool, crew, &schedule, &economy, steps * 2);
            prop_assert!(fine.profit >= coarse.profit);
        }
    }
}
