//! Small hand-built worlds shared by unit tests.

use crate::{
    config::{Difficulty, SimConfig},
    geo::GeoPoint,
    world::{AircraftType, DemandProfile, RouteDemand, World},
};

pub fn a320() -> AircraftType {
    AircraftType {
        code: "A320".into(),
        name: "Airbus A320".into(),
        range_nm: 3300.0,
        speed_kts: 470.0,
        capacity: 150,
        cost: 10.0e6,
        fuel_per_nm: 8.0,
        maintenance_per_nm: 4.0,
    }
}

/// LHR, CDG and AMS fully connected at a flat 0.5 demand fraction, one
/// A320 based at LHR, no AI airlines.
pub fn tiny_world_with(config: SimConfig) -> World {
    let mut world = World::new(config, Difficulty::Medium, 6.0, 5.0e6);
    world.add_airport("LHR", "London Heathrow", GeoPoint::new(51.47, -0.4543), true);
    world.add_airport("CDG", "Paris Charles de Gaulle", GeoPoint::new(49.0097, 2.5479), true);
    world.add_airport("AMS", "Amsterdam Schiphol", GeoPoint::new(52.3105, 4.7683), true);
    world.add_aircraft_type(a320());
    let demand = DemandProfile {
        morning: 0.5,
        afternoon: 0.5,
        evening: 0.5,
    };
    for (origin, destination) in [
        ("LHR", "CDG"),
        ("CDG", "LHR"),
        ("LHR", "AMS"),
        ("AMS", "LHR"),
        ("CDG", "AMS"),
        ("AMS", "CDG"),
    ] {
        world.add_route(RouteDemand {
            origin: origin.into(),
            destination: destination.into(),
            demand,
            duration_hours: 1.0,
        });
    }
    world
        .spawn_player_aircraft("A320", "LHR", None)
        .expect("fixture aircraft");
    world
}

pub fn tiny_world() -> World {
    tiny_world_with(SimConfig::default())
}
