use anyhow::{Context, Result};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    geo,
    market::competitors,
    rng::SystemRng,
    world::{Aircraft, AircraftStatus, Airline, World},
};

/// Sets up the AI market and keeps cosmetic AI traffic moving on the map.
/// Cosmetic aircraft take off on a random route and are retired on landing;
/// they never carry passengers.
pub struct AiTrafficSystem {
    fleet_size: usize,
}

impl AiTrafficSystem {
    pub fn new(fleet_size: usize) -> Self {
        Self { fleet_size }
    }
}

impl Default for AiTrafficSystem {
    fn default() -> Self {
        Self::new(3)
    }
}

impl System for AiTrafficSystem {
    fn name(&self) -> &str {
        "ai_traffic"
    }

    fn start(&mut self, world: &mut World, rng: &mut SystemRng<'_>) -> Result<()> {
        competitors::generate(world, self.fleet_size, rng).context("generating AI airlines")?;
        Ok(())
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        world
            .aircraft
            .retain(|ac| ac.is_player() || ac.status != AircraftStatus::Landed);

        let config = &world.config.ai;
        let airborne = world.aircraft.iter().filter(|ac| !ac.is_player()).count();
        // spawn_chance is per five simulated minutes
        let chance = (config.spawn_chance * ctx.dt_hours * 12.0).min(1.0);
        if airborne >= config.max_traffic || world.routes.is_empty() || !rng.gen_bool(chance.max(0.0)) {
            return Ok(());
        }

        let Some(route) = world.routes.choose(rng) else {
            return Ok(());
        };
        let Some(airline) = world.airline_codes.choose(rng) else {
            return Ok(());
        };
        let reference_type = config.reference_type.clone();
        let (Ok(from), Ok(to)) = (world.airport(&route.origin), world.airport(&route.destination)) else {
            return Ok(());
        };
        let mut aircraft = Aircraft::landed_at(
            String::new(),
            format!("{airline} {}", route.key()),
            Airline::Ai(airline.clone()),
            &reference_type,
            from,
        );
        aircraft.destination = to.code.clone();
        aircraft.progress = 0.0;
        aircraft.heading = geo::bearing(from.position, to.position).unwrap_or(0.0);
        aircraft.status = AircraftStatus::InFlight;

        aircraft.id = world.ids.next_ai_aircraft();
        debug!(aircraft = %aircraft.id, route = %route.key(), "AI traffic spawned");
        world.aircraft.push(aircraft);
        Ok(())
    }
}
