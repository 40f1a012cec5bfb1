//! Revenue, itemised cost, profit and satisfaction for a flown leg.

use tracing::warn;

use crate::{
    config::{Difficulty, EconomyConfig},
    error::SimError,
    market::demand::{self, EventSource},
    staff::StaffRole,
    world::{
        Aircraft, CompletedFlightLeg, CostBreakdown, FlightLeg, HubTier, TimeBucket,
        UnservedOpportunity, Upgrades, World,
    },
};

/// Everything about a leg that does not depend on how many passengers board.
#[derive(Debug, Clone, PartialEq)]
pub struct LegTerms {
    pub distance: f64,
    pub capacity: u32,
    pub fuel: f64,
    pub maintenance: f64,
    pub staff: f64,
    pub meal_per_passenger: f64,
    pub rival_hub: bool,
    revenue_per_passenger_mile: f64,
    rival_hub_profit_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Financials {
    pub revenue: f64,
    pub cost: CostBreakdown,
    pub profit: f64,
}

impl LegTerms {
    pub fn for_leg(
        world: &World,
        aircraft: &Aircraft,
        origin: &str,
        destination: &str,
        duration_hours: f64,
    ) -> Result<Self, SimError> {
        let config = world.config();
        let kind = world.aircraft_type(&aircraft.type_code)?;
        let from = world.airport(origin)?;
        let to = world.airport(destination)?;
        let distance = world.distance_between(origin, destination)?;
        if !distance.is_finite() {
            return Err(SimError::corrupt(&aircraft.id, format!("distance {origin}-{destination} is not finite")));
        }

        let hub_fuel = match from.hub_tier {
            HubTier::Large => config.economy.large_hub_fuel_factor,
            HubTier::Small => config.economy.small_hub_fuel_factor,
            HubTier::None => 1.0,
        };
        let shift = config.staff.shift_hours.max(f64::EPSILON);
        let staff = [StaffRole::Pilot, StaffRole::CabinCrew]
            .into_iter()
            .filter(|role| world.staff().assigned(*role, &aircraft.id).is_some())
            .map(|role| role.daily_rate(&config.staff) * duration_hours / shift)
            .sum();
        let rival_hub = to
            .ai_hub
            .as_deref()
            .is_some_and(|owner| owner != aircraft.airline.code());

        Ok(Self {
            distance,
            capacity: kind.capacity,
            fuel: distance * kind.fuel_per_nm * hub_fuel * world.fuel_multiplier(),
            maintenance: distance * kind.maintenance_per_nm * config.economy.maintenance_multiplier,
            staff,
            meal_per_passenger: if aircraft.upgrades.meal_service {
                config.economy.meal_cost_per_passenger
            } else {
                0.0
            },
            rival_hub,
            revenue_per_passenger_mile: config.economy.revenue_per_passenger_mile,
            rival_hub_profit_factor: config.economy.rival_hub_profit_factor,
        })
    }

    /// A rival hub at the destination takes a cut of any positive margin,
    /// booked as its own cost line so that `profit == revenue - cost.total`.
    pub fn financials(&self, boarded: u32, fare: f64) -> Financials {
        let passengers = f64::from(boarded);
        let revenue = passengers * self.distance * self.revenue_per_passenger_mile * fare;
        let meals = passengers * self.meal_per_passenger;
        let base = self.fuel + self.maintenance + self.staff + meals;
        let rival_hub = if self.rival_hub {
            (revenue - base).max(0.0) * (1.0 - self.rival_hub_profit_factor)
        } else {
            0.0
        };
        let total = base + rival_hub;
        Financials {
            revenue,
            cost: CostBreakdown {
                fuel: self.fuel,
                maintenance: self.maintenance,
                staff: self.staff,
                meals,
                rival_hub,
                total,
            },
            profit: revenue - total,
        }
    }

    pub fn revenue_per_passenger(&self) -> f64 {
        self.distance * self.revenue_per_passenger_mile
    }
}

pub fn satisfaction_delta(fare: f64, upgrades: &Upgrades, difficulty: Difficulty, economy: &EconomyConfig) -> f64 {
    let fare_bonus = (1.0 - fare) * economy.fare_satisfaction_weight;
    let amenity_bonus = economy.amenity_satisfaction_bonus * f64::from(upgrades.count());
    (1.0 + fare_bonus + amenity_bonus) * difficulty.satisfaction_modifier()
}

/// Outcome of settling one revenue leg.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSettlement {
    pub record: CompletedFlightLeg,
    pub satisfaction_delta: f64,
    pub unserved: Option<UnservedOpportunity>,
}

/// Prices a completed revenue leg against today's market.
pub fn settle_leg(world: &World, aircraft: &Aircraft, leg: &FlightLeg, landed_at: f64) -> Result<LegSettlement, SimError> {
    let config = world.config();
    let terms = LegTerms::for_leg(world, aircraft, &leg.origin, &leg.destination, leg.duration)?;
    let route = world.route(&leg.origin, &leg.destination)?;
    let bucket = TimeBucket::from_hour(leg.departure);
    let pool = demand::passenger_pool(world, route, terms.capacity, bucket, EventSource::Daily)?;
    let rivals = demand::competitors(world, &aircraft.id, &leg.origin, &leg.destination, leg.departure)?;

    let key = leg.route_key();
    let satisfaction = world
        .route_stats()
        .satisfaction_or(&key, config.economy.default_satisfaction);
    let own_score = demand::competitive_score(satisfaction, aircraft.upgrades.count(), leg.fare, &config.economy);
    let factor = demand::fare_effect(leg.fare, &config.economy) * demand::crew_bonus(world, &aircraft.id);
    let allocation = demand::allocate(pool, terms.capacity, own_score, &rivals, factor);
    let money = terms.financials(allocation.boarded, leg.fare);

    let unserved = allocation.missed(terms.capacity).map(|missed| UnservedOpportunity {
        route_key: key.clone(),
        passengers_missed: missed,
        potential_revenue: f64::from(missed) * terms.revenue_per_passenger(),
        aircraft_type: aircraft.type_code.clone(),
    });

    Ok(LegSettlement {
        record: CompletedFlightLeg {
            origin: leg.origin.clone(),
            destination: leg.destination.clone(),
            miles: terms.distance,
            passengers: allocation.boarded,
            revenue: money.revenue,
            cost: money.cost.total,
            profit: money.profit,
            timestamp: landed_at,
            breakdown: money.cost,
        },
        satisfaction_delta: satisfaction_delta(leg.fare, &aircraft.upgrades, world.difficulty(), &config.economy),
        unserved,
    })
}

/// Cost-only leg flown to bring an aircraft home.
pub fn settle_reposition(world: &World, aircraft: &Aircraft, origin: &str, destination: &str, landed_at: f64) -> Result<CompletedFlightLeg, SimError> {
    let terms = LegTerms::for_leg(world, aircraft, origin, destination, 0.0)?;
    let money = terms.financials(0, 1.0);
    Ok(CompletedFlightLeg {
        origin: origin.to_string(),
        destination: destination.to_string(),
        miles: terms.distance,
        passengers: 0,
        revenue: 0.0,
        cost: money.cost.total,
        profit: money.profit,
        timestamp: landed_at,
        breakdown: money.cost,
    })
}

/// Zero-valued record used when a leg cannot be priced.
pub fn neutral_record(origin: &str, destination: &str, landed_at: f64) -> CompletedFlightLeg {
    CompletedFlightLeg {
        origin: origin.to_string(),
        destination: destination.to_string(),
        miles: 0.0,
        passengers: 0,
        revenue: 0.0,
        cost: 0.0,
        profit: 0.0,
        timestamp: landed_at,
        breakdown: CostBreakdown::default(),
    }
}

/// Settles a leg, falling back to a neutral zero-profit record when
/// reference data is missing.
pub fn settle_or_neutral(world: &World, aircraft: &Aircraft, leg: &FlightLeg, landed_at: f64) -> LegSettlement {
    match settle_leg(world, aircraft, leg, landed_at) {
        Ok(settlement) => settlement,
        Err(err) => {
            warn!(aircraft = %aircraft.id, route = %leg.route_key(), error = %err, "leg settled as zero profit");
            LegSettlement {
                record: neutral_record(&leg.origin, &leg.destination, landed_at),
                satisfaction_delta: 0.0,
                unserved: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(rival_hub: bool) -> LegTerms {
        LegTerms {
            distance: 200.0,
            capacity: 150,
            fuel: 1_600.0,
            maintenance: 960.0,
            staff: 0.0,
            meal_per_passenger: 15.0,
            rival_hub,
            revenue_per_passenger_mile: 0.22,
            rival_hub_profit_factor: 0.9,
        }
    }

    #[test]
    fn profit_is_revenue_minus_cost() {
        for rival in [false, true] {
            let money = terms(rival).financials(120, 1.1);
            assert!((money.profit - (money.revenue - money.cost.total)).abs() < 1e-9);
            let parts = money.cost.fuel + money.cost.maintenance + money.cost.staff + money.cost.meals + money.cost.rival_hub;
            assert!((parts - money.cost.total).abs() < 1e-9);
        }
    }

    #[test]
    fn rival_hub_takes_a_tenth_of_the_margin_only() {
        let plain = terms(false).financials(150, 1.0);
        let rival = terms(true).financials(150, 1.0);
        assert!((rival.profit - plain.profit * 0.9).abs() < 1e-9);
        let losing = terms(true).financials(0, 1.0);
        assert_eq!(losing.cost.rival_hub, 0.0);
    }

    #[test]
    fn satisfaction_rewards_cheap_fares_and_amenities() {
        let economy = EconomyConfig::default();
        let none = Upgrades::default();
        let all = Upgrades {
            ife: true,
            wifi: true,
            meal_service: true,
        };
        assert!((satisfaction_delta(1.0, &none, Difficulty::Medium, &economy) - 1.0).abs() < 1e-12);
        assert!((satisfaction_delta(0.8, &all, Difficulty::Medium, &economy) - 3.5).abs() < 1e-12);
        assert!((satisfaction_delta(1.0, &none, Difficulty::Hard, &economy) - 0.8).abs() < 1e-12);
    }
}
