//! AI airlines: home hubs, static daily rotations, and per-route satisfaction.

use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::SimError,
    world::{FlightLeg, World},
};

/// Two-level keyed store: airline code, then route key, to a score in [0, 100].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SatisfactionStore {
    scores: BTreeMap<String, BTreeMap<String, f64>>,
}

impl SatisfactionStore {
    pub fn get(&self, airline: &str, route: &str) -> Option<f64> {
        self.scores.get(airline)?.get(route).copied()
    }

    pub fn set(&mut self, airline: &str, route: &str, score: f64) {
        let score = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
        self.scores
            .entry(airline.to_string())
            .or_default()
            .insert(route.to_string(), score);
    }

    pub fn airlines(&self) -> impl Iterator<Item = &String> {
        self.scores.keys()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAirline {
    pub code: String,
    pub hub: String,
    /// One ordered rotation per aircraft.
    pub rotations: Vec<Vec<FlightLeg>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiMarket {
    airlines: Vec<AiAirline>,
    satisfaction: SatisfactionStore,
}

impl AiMarket {
    pub fn airlines(&self) -> &[AiAirline] {
        &self.airlines
    }

    pub fn satisfaction(&self) -> &SatisfactionStore {
        &self.satisfaction
    }

    /// Every scheduled AI leg, tagged with the operating airline.
    pub fn legs(&self) -> impl Iterator<Item = (&str, &FlightLeg)> {
        self.airlines.iter().flat_map(|airline| {
            airline
                .rotations
                .iter()
                .flatten()
                .map(move |leg| (airline.code.as_str(), leg))
        })
    }

    pub fn insert(&mut self, airline: AiAirline) {
        self.airlines.push(airline);
    }
}

/// Builds the AI market once at game start and marks each AI hub airport.
pub fn generate(world: &mut World, fleet_size: usize, rng: &mut impl Rng) -> Result<(), SimError> {
    let config = world.config().ai.clone();
    let schedule = world.config().schedule.clone();
    let speed = world.aircraft_type(&config.reference_type)?.speed_kts;
    if speed <= 0.0 || !speed.is_finite() {
        return Err(SimError::corrupt(
            config.reference_type.clone(),
            format!("non-positive cruise speed {speed}"),
        ));
    }

    let mut hubs: Vec<String> = world.airports().map(|a| a.code.clone()).collect();
    hubs.shuffle(rng);
    let codes = world.airline_codes.clone();
    if codes.len() > hubs.len() {
        warn!(
            airlines = codes.len(),
            airports = hubs.len(),
            "more AI airlines than airports; extra airlines get no hub"
        );
    }

    let mut market = AiMarket::default();
    for (code, hub) in codes.iter().zip(hubs) {
        for route in world.routes() {
            let mut score = rng.gen_range(config.satisfaction_min..=config.satisfaction_max);
            if route.origin == hub || route.destination == hub {
                score += config.hub_satisfaction_bonus;
            }
            market.satisfaction.set(code, &route.key(), score);
        }

        let mut rotations = Vec::with_capacity(fleet_size);
        for _ in 0..fleet_size {
            let mut legs = Vec::new();
            let mut at = hub.clone();
            let mut clock = schedule.day_start_hour + rng.gen::<f64>() * config.start_jitter_hours;
            for _ in 0..config.legs_per_aircraft {
                let outbound = world.routes_from(&at);
                let Some(route) = outbound.choose(rng) else {
                    break;
                };
                let distance = world.distance_between(&route.origin, &route.destination)?;
                let duration = distance / speed;
                if clock + duration > schedule.horizon_hours {
                    break;
                }
                legs.push(FlightLeg::new(&route.origin, &route.destination, clock, duration, 1.0));
                clock += duration + schedule.turnaround_hours(duration);
                at = route.destination.clone();
            }
            rotations.push(legs);
        }

        if let Some(airport) = world.airports.get_mut(&hub) {
            airport.ai_hub = Some(code.clone());
        }
        info!(airline = %code, hub = %hub, aircraft = rotations.len(), "AI airline ready");
        market.insert(AiAirline {
            code: code.clone(),
            hub,
            rotations,
        });
    }

    world.ai = market;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Difficulty, SimConfig},
        geo::GeoPoint,
        world::{AircraftType, DemandProfile, RouteDemand},
    };
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_world() -> World {
        let mut world = World::new(SimConfig::default(), Difficulty::Medium, 6.0, 1.0e6);
        world.add_airport("LHR", "London", GeoPoint::new(51.47, -0.4543), true);
        world.add_airport("CDG", "Paris", GeoPoint::new(49.0097, 2.5479), true);
        world.add_airport("AMS", "Amsterdam", GeoPoint::new(52.3105, 4.7683), true);
        world.add_aircraft_type(AircraftType {
            code: "A320".into(),
            name: "Airbus A320".into(),
            range_nm: 3300.0,
            speed_kts: 470.0,
            capacity: 150,
            cost: 10.0e6,
            fuel_per_nm: 8.0,
            maintenance_per_nm: 4.0,
        });
        let demand = DemandProfile {
            morning: 1.0,
            afternoon: 1.0,
            evening: 1.0,
        };
        for (o, d) in [("LHR", "CDG"), ("CDG", "LHR"), ("LHR", "AMS"), ("AMS", "LHR"), ("CDG", "AMS"), ("AMS", "CDG")] {
            world.add_route(RouteDemand {
                origin: o.into(),
                destination: d.into(),
                demand,
                duration_hours: 1.0,
            });
        }
        world.set_airline_codes(vec!["BA".into(), "AF".into()]);
        world
    }

    #[test]
    fn hubs_are_unique_and_rotations_fit_the_horizon() {
        let mut world = small_world();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        generate(&mut world, 4, &mut rng).unwrap();
        let market = world.ai_market();
        assert_eq!(market.airlines().len(), 2);
        assert_ne!(market.airlines()[0].hub, market.airlines()[1].hub);
        for airline in market.airlines() {
            assert_eq!(world.airport(&airline.hub).unwrap().ai_hub.as_deref(), Some(airline.code.as_str()));
            for rotation in &airline.rotations {
                assert!(rotation.len() <= 8);
                if let Some(first) = rotation.first() {
                    assert_eq!(first.origin, airline.hub);
                }
                for pair in rotation.windows(2) {
                    assert_eq!(pair[0].destination, pair[1].origin);
                    assert!(pair[1].departure >= pair[0].arrival);
                }
                assert!(rotation.iter().all(|leg| leg.arrival <= 26.0));
            }
        }
    }

    #[test]
    fn hub_routes_get_the_bonus_range() {
        let mut world = small_world();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        generate(&mut world, 1, &mut rng).unwrap();
        let airline = &world.ai_market().airlines()[0];
        for route in world.routes() {
            let score = world.ai_market().satisfaction().get(&airline.code, &route.key()).unwrap();
            if route.origin == airline.hub || route.destination == airline.hub {
                assert!((50.0..=70.0).contains(&score));
            } else {
                assert!((40.0..=60.0).contains(&score));
            }
        }
    }

    proptest! {
        #[test]
        fn store_always_clamps(score in -1.0e6f64..1.0e6) {
            let mut store = SatisfactionStore::default();
            store.set("BA", "LHR-CDG", score);
            let stored = store.get("BA", "LHR-CDG").unwrap();
            prop_assert!((0.0..=100.0).contains(&stored));
        }
    }
}
