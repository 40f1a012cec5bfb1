//! Passenger pools per route and time-of-day bucket, and the allocation of a
//! pool among the carriers flying it.

use crate::{
    config::EconomyConfig,
    error::SimError,
    staff::{skill_multiplier, StaffRole},
    world::{route_key, Airline, EventKind, HubTier, RouteDemand, TimeBucket, World},
};

/// Which event list drives the pool: today's resolved events, or the weekly
/// forecast for a given day of the cycle (used when planning).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Daily,
    Forecast { day: u32 },
}

pub fn hub_demand_bonus(world: &World, origin: &str, destination: &str) -> Result<f64, SimError> {
    let economy = &world.config().economy;
    let bonus = |tier: HubTier| match tier {
        HubTier::Large => economy.large_hub_demand_bonus,
        HubTier::Small => economy.small_hub_demand_bonus,
        HubTier::None => 0.0,
    };
    let from = bonus(world.airport(origin)?.hub_tier);
    let to = bonus(world.airport(destination)?.hub_tier);
    Ok(from.max(to))
}

pub fn campaign_active(world: &World, key: &str) -> bool {
    let now = world.time_hours();
    world
        .campaigns()
        .iter()
        .any(|c| c.route_key == key && c.expires_at > now)
}

/// Product of the campaign boost and every event touching either endpoint.
pub fn event_multiplier(world: &World, origin: &str, destination: &str, source: EventSource) -> f64 {
    let touches = |target: &str| target == origin || target == destination;
    let mut multiplier = 1.0;
    match source {
        EventSource::Daily => {
            if let Some(strike) = world
                .daily_events()
                .iter()
                .find(|e| e.kind == EventKind::Strike && touches(&e.target))
            {
                multiplier *= (1.0 - strike.value).max(0.0);
            }
            if let Some(boost) = world
                .daily_events()
                .iter()
                .find(|e| e.kind.boosts_demand() && touches(&e.target))
            {
                multiplier *= boost.value;
            }
        }
        EventSource::Forecast { day } => {
            if let Some(boost) = world
                .forecast()
                .iter()
                .find(|e| e.kind.boosts_demand() && e.day == day && touches(&e.target))
            {
                multiplier *= boost.value;
            }
        }
    }
    if campaign_active(world, &route_key(origin, destination)) {
        multiplier *= world.config().economy.campaign_boost;
    }
    multiplier
}

/// `floor(reference_capacity * fraction * (1 + hub bonus) * event multiplier)`.
pub fn passenger_pool(
    world: &World,
    route: &RouteDemand,
    reference_capacity: u32,
    bucket: TimeBucket,
    source: EventSource,
) -> Result<u32, SimError> {
    let hub = hub_demand_bonus(world, &route.origin, &route.destination)?;
    let events = event_multiplier(world, &route.origin, &route.destination, source);
    let raw = f64::from(reference_capacity) * route.demand.fraction(bucket) * (1.0 + hub) * events;
    Ok(floor_count(raw))
}

pub fn floor_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

pub fn fare_effect(fare: f64, economy: &EconomyConfig) -> f64 {
    1.0 - (fare - 1.0) * economy.fare_elasticity
}

/// Demand multiplier from the cabin crew assigned to `aircraft_id`.
pub fn crew_bonus(world: &World, aircraft_id: &str) -> f64 {
    let staff = &world.config().staff;
    match world.staff().assigned(StaffRole::CabinCrew, aircraft_id) {
        Some(crew) => 1.0 + staff.cabin_crew_demand_bonus * skill_multiplier(crew.level, staff),
        None => 1.0,
    }
}

pub fn competitive_score(satisfaction: f64, amenities: u32, fare: f64, economy: &EconomyConfig) -> f64 {
    satisfaction
        + economy.amenity_score_bonus * f64::from(amenities)
        + (economy.price_score_pivot - fare) * economy.price_score_weight
}

/// Another departure on the same route inside the competition window.
#[derive(Debug, Clone, PartialEq)]
pub struct Competitor {
    pub airline: Airline,
    pub type_code: String,
    pub capacity: u32,
    pub departure: f64,
    pub score: f64,
}

/// Collects AI and other player legs on `origin -> destination` departing
/// within the window of `departure`. Player aircraft with an unknown type are
/// left out of the tally.
pub fn competitors(
    world: &World,
    aircraft_id: &str,
    origin: &str,
    destination: &str,
    departure: f64,
) -> Result<Vec<Competitor>, SimError> {
    let config = world.config();
    let window = config.schedule.competition_window_hours;
    let same_slot = |o: &str, d: &str, dep: f64| o == origin && d == destination && (dep - departure).abs() < window;
    let key = route_key(origin, destination);
    let mut found = Vec::new();

    let ai_type = world.aircraft_type(&config.ai.reference_type)?;
    for (airline, leg) in world.ai_market().legs() {
        if !same_slot(&leg.origin, &leg.destination, leg.departure) {
            continue;
        }
        let satisfaction = world
            .ai_market()
            .satisfaction()
            .get(airline, &key)
            .unwrap_or(config.economy.default_satisfaction);
        found.push(Competitor {
            airline: Airline::Ai(airline.to_string()),
            type_code: ai_type.code.clone(),
            capacity: ai_type.capacity,
            departure: leg.departure,
            score: competitive_score(satisfaction, 0, 1.0, &config.economy),
        });
    }

    let own_satisfaction = world
        .route_stats()
        .satisfaction_or(&key, config.economy.default_satisfaction);
    for other in world.player_fleet().filter(|ac| ac.id != aircraft_id) {
        let Ok(other_type) = world.aircraft_type(&other.type_code) else {
            tracing::warn!(aircraft = %other.id, type_code = %other.type_code, "unknown type left out of competition");
            continue;
        };
        for leg in other.schedule.iter().filter(|l| same_slot(&l.origin, &l.destination, l.departure)) {
            found.push(Competitor {
                airline: Airline::Player,
                type_code: other_type.code.clone(),
                capacity: other_type.capacity,
                departure: leg.departure,
                score: competitive_score(own_satisfaction, other.upgrades.count(), leg.fare, &config.economy),
            });
        }
    }
    Ok(found)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub pool: u32,
    pub total_capacity: u32,
    pub boarded: u32,
    pub saturated: bool,
}

impl Allocation {
    /// Passengers left behind when every seat on the route was taken.
    pub fn missed(&self, capacity: u32) -> Option<u32> {
        (self.boarded >= capacity && self.pool > self.total_capacity)
            .then(|| self.pool - self.total_capacity)
    }
}

/// Boards at most what the carrier would carry alone, never more than its
/// seats, and under saturation no more than its score share of the pool.
pub fn allocate(
    pool: u32,
    capacity: u32,
    own_score: f64,
    competitors: &[Competitor],
    demand_factor: f64,
) -> Allocation {
    let total_capacity = competitors
        .iter()
        .fold(capacity, |sum, c| sum.saturating_add(c.capacity));
    let alone = floor_count(f64::from(pool) * demand_factor).min(capacity);
    if total_capacity <= pool {
        return Allocation {
            pool,
            total_capacity,
            boarded: alone,
            saturated: false,
        };
    }
    let total_score: f64 = own_score + competitors.iter().map(|c| c.score).sum::<f64>();
    let share = if total_score > 0.0 && own_score > 0.0 {
        own_score / total_score
    } else {
        0.0
    };
    let by_share = (f64::from(pool) * share).round();
    let boarded = if by_share.is_finite() && by_share > 0.0 {
        (by_share as u32).min(alone)
    } else {
        0
    };
    Allocation {
        pool,
        total_capacity,
        boarded,
        saturated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_support, world::GameEvent};

    fn event(kind: EventKind, target: &str, value: f64) -> GameEvent {
        GameEvent {
            kind,
            target: target.into(),
            value,
            day: 1,
            probability: None,
            description: String::new(),
        }
    }

    fn lhr_cdg_pool(world: &World) -> u32 {
        let route = world.route("LHR", "CDG").unwrap();
        passenger_pool(world, route, 150, TimeBucket::Morning, EventSource::Daily).unwrap()
    }

    fn rival(capacity: u32, score: f64) -> Competitor {
        Competitor {
            airline: Airline::Player,
            type_code: "A320".into(),
            capacity,
            departure: 8.0,
            score,
        }
    }

    #[test]
    fn half_full_route_pools_seventy_five() {
        let world = test_support::tiny_world();
        let pool = lhr_cdg_pool(&world);
        assert_eq!(pool, 75);

        let allocation = allocate(pool, 150, 52.0, &[], fare_effect(1.0, &world.config().economy));
        assert!(allocation.saturated);
        assert_eq!(allocation.total_capacity, 150);
        assert_eq!(allocation.boarded, 75);
        assert_eq!(allocation.missed(150), None);
    }

    #[test]
    fn spare_demand_boards_by_fare_alone() {
        let allocation = allocate(300, 150, 52.0, &[], 0.4);
        assert!(!allocation.saturated);
        assert_eq!(allocation.boarded, 120);
        assert_eq!(allocation.missed(150), None);
    }

    #[test]
    fn larger_hub_bonus_wins() {
        let mut world = test_support::tiny_world();
        world.spawn_player_aircraft("A320", "LHR", None).unwrap();
        world.refresh_hub_tiers();
        assert_eq!(world.airport("LHR").unwrap().hub_tier, HubTier::Small);
        assert!((hub_demand_bonus(&world, "LHR", "CDG").unwrap() - 0.10).abs() < 1e-12);
        assert_eq!(lhr_cdg_pool(&world), 82);

        for _ in 0..5 {
            world.spawn_player_aircraft("A320", "CDG", None).unwrap();
        }
        world.refresh_hub_tiers();
        assert_eq!(world.airport("CDG").unwrap().hub_tier, HubTier::Large);
        assert_eq!(lhr_cdg_pool(&world), 93);
    }

    #[test]
    fn strikes_and_demand_events_scale_the_pool() {
        let mut world = test_support::tiny_world();
        world.daily_events_mut().push(event(EventKind::Strike, "CDG", 0.5));
        assert_eq!(lhr_cdg_pool(&world), 37);

        world.daily_events_mut().push(event(EventKind::Concert, "LHR", 2.0));
        assert_eq!(lhr_cdg_pool(&world), 75);

        world.daily_events_mut().clear();
        world.daily_events_mut().push(event(EventKind::Sports, "AMS", 2.0));
        assert_eq!(lhr_cdg_pool(&world), 75);
    }

    #[test]
    fn campaign_boosts_only_its_route() {
        let mut world = test_support::tiny_world();
        world.launch_campaign("LHR", "CDG").unwrap();
        assert_eq!(lhr_cdg_pool(&world), 93);

        let reverse = world.route("CDG", "LHR").unwrap();
        let pool = passenger_pool(&world, reverse, 150, TimeBucket::Morning, EventSource::Daily).unwrap();
        assert_eq!(pool, 75);
    }

    #[test]
    fn equal_carriers_split_a_saturated_pool() {
        let allocation = allocate(100, 150, 52.0, &[rival(150, 52.0)], 1.0);
        assert!(allocation.saturated);
        assert_eq!(allocation.total_capacity, 300);
        assert_eq!(allocation.boarded, 50);
    }

    #[test]
    fn share_never_exceeds_solo_demand() {
        let allocation = allocate(200, 150, 500.0, &[rival(100, 1.0)], 0.5);
        assert_eq!(allocation.boarded, 100);
    }

    #[test]
    fn full_flight_on_undersupplied_route_reports_missed_passengers() {
        let allocation = allocate(400, 150, 50.0, &[rival(150, 50.0)], 1.0);
        assert!(!allocation.saturated);
        assert_eq!(allocation.boarded, 150);
        assert_eq!(allocation.missed(150), Some(100));
    }

    #[test]
    fn fare_effect_is_linear() {
        let economy = EconomyConfig::default();
        assert!((fare_effect(1.0, &economy) - 1.0).abs() < 1e-12);
        assert!((fare_effect(1.2, &economy) - 0.7).abs() < 1e-12);
        assert!((fare_effect(0.8, &economy) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn floor_count_rejects_nonsense() {
        assert_eq!(floor_count(f64::NAN), 0);
        assert_eq!(floor_count(-3.0), 0);
        assert_eq!(floor_count(74.99), 74);
    }
}
