//! Player commands. Each either applies in full and returns `Ok`, or returns a
//! `CommandError` and leaves the world untouched.

use rand::Rng;
use tracing::info;

use crate::{
    error::{CommandError, SimError},
    market::{demand, planner},
    staff::StaffRole,
    world::{route_key, AircraftStatus, FlightLeg, MarketingCampaign, Upgrade, World},
};

impl World {
    fn ensure_unlocked(&self) -> Result<(), CommandError> {
        if self.schedules_locked {
            Err(CommandError::SchedulesLocked)
        } else {
            Ok(())
        }
    }

    fn ensure_cash(&self, needed: f64) -> Result<(), CommandError> {
        if self.ledger.cash < needed {
            Err(CommandError::InsufficientCash {
                needed,
                available: self.ledger.cash,
            })
        } else {
            Ok(())
        }
    }

    fn player_aircraft_index(&self, id: &str) -> Result<usize, CommandError> {
        self.aircraft
            .iter()
            .position(|ac| ac.id == id && ac.is_player())
            .ok_or_else(|| SimError::UnknownAircraft(id.to_string()).into())
    }

    /// Appends `origin -> destination` after the last scheduled leg (or at the
    /// start of the operating day), priced by the fare optimiser.
    pub fn assign_leg(&mut self, aircraft_id: &str, origin: &str, destination: &str) -> Result<FlightLeg, CommandError> {
        self.ensure_unlocked()?;
        let index = self.player_aircraft_index(aircraft_id)?;
        let aircraft = &self.aircraft[index];
        if self.route(origin, destination).is_err() {
            return Err(CommandError::NoDirectRoute {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }
        let last = aircraft.schedule.last();
        let expected = last.map_or(aircraft.home_base.as_str(), |leg| leg.destination.as_str());
        if origin != expected {
            return Err(CommandError::DisconnectedLeg {
                expected: expected.to_string(),
                actual: origin.to_string(),
            });
        }

        let schedule = &self.config.schedule;
        let kind = self.aircraft_type(&aircraft.type_code)?;
        let distance = self.distance_between(origin, destination)?;
        if distance > kind.range_nm {
            return Err(CommandError::OutOfRange {
                distance,
                range: kind.range_nm,
            });
        }
        if kind.speed_kts <= 0.0 {
            return Err(SimError::corrupt(&kind.code, "non-positive cruise speed").into());
        }
        let duration = distance / kind.speed_kts;
        let departure = last.map_or(schedule.day_start_hour, |leg| {
            leg.effective_arrival() + schedule.turnaround_hours(leg.duration)
        });
        let arrival = departure + duration;
        if arrival > schedule.horizon_hours {
            return Err(CommandError::PastHorizon {
                arrival,
                horizon: schedule.horizon_hours,
            });
        }

        let quote = planner::quote_leg(self, aircraft, origin, destination, departure, duration)?;
        let leg = FlightLeg::new(origin, destination, departure, duration, quote.fare);
        info!(aircraft = %aircraft_id, route = %leg.route_key(), departure, fare = quote.fare, "leg assigned");
        self.aircraft[index].schedule.push(leg.clone());
        Ok(leg)
    }

    pub fn remove_last_leg(&mut self, aircraft_id: &str) -> Result<FlightLeg, CommandError> {
        self.ensure_unlocked()?;
        let index = self.player_aircraft_index(aircraft_id)?;
        self.aircraft[index]
            .schedule
            .pop()
            .ok_or_else(|| CommandError::EmptySchedule(aircraft_id.to_string()))
    }

    pub fn clear_schedule(&mut self, aircraft_id: &str) -> Result<(), CommandError> {
        self.ensure_unlocked()?;
        let index = self.player_aircraft_index(aircraft_id)?;
        self.aircraft[index].schedule.clear();
        Ok(())
    }

    pub fn set_fare(&mut self, aircraft_id: &str, leg_index: usize, fare: f64) -> Result<(), CommandError> {
        self.ensure_unlocked()?;
        if !self.config.schedule.fare_in_range(fare) {
            return Err(CommandError::FareOutOfRange(fare));
        }
        let index = self.player_aircraft_index(aircraft_id)?;
        let leg = self.aircraft[index]
            .schedule
            .get_mut(leg_index)
            .ok_or_else(|| SimError::UnknownLeg {
                aircraft: aircraft_id.to_string(),
                index: leg_index,
            })?;
        leg.fare = fare;
        Ok(())
    }

    /// Closes the rotation with a direct leg back to the home base.
    pub fn schedule_return_to_base(&mut self, aircraft_id: &str) -> Result<FlightLeg, CommandError> {
        self.ensure_unlocked()?;
        let index = self.player_aircraft_index(aircraft_id)?;
        let aircraft = &self.aircraft[index];
        let Some(last) = aircraft.schedule.last() else {
            return Err(CommandError::EmptySchedule(aircraft_id.to_string()));
        };
        let home = aircraft.home_base.clone();
        let from = last.destination.clone();
        if from == home {
            return Err(CommandError::AlreadyHome(home));
        }
        self.assign_leg(aircraft_id, &from, &home)
    }

    /// Replaces the schedule with the planner's round trip. Returns the number
    /// of legs applied.
    pub fn auto_schedule(&mut self, aircraft_id: &str, rng: &mut impl Rng) -> Result<usize, CommandError> {
        self.ensure_unlocked()?;
        let index = self.player_aircraft_index(aircraft_id)?;
        let legs = planner::plan_round_trip(self, aircraft_id, rng)?;
        let count = legs.len();
        info!(aircraft = %aircraft_id, legs = count, "auto-scheduled");
        self.aircraft[index].schedule = legs;
        Ok(count)
    }

    pub fn purchase_aircraft(&mut self, type_code: &str, base: &str, name: Option<&str>) -> Result<String, CommandError> {
        let cost = self.aircraft_type(type_code)?.cost;
        self.airport(base)?;
        self.ensure_cash(cost)?;
        let id = self.spawn_player_aircraft(type_code, base, name)?;
        self.ledger.spend(cost);
        self.refresh_hub_tiers();
        info!(aircraft = %id, type_code, base, cost, "aircraft purchased");
        Ok(id)
    }

    /// Moves an aircraft's home base. The aircraft is grounded for a day and
    /// its schedule is cleared.
    pub fn rebase_aircraft(&mut self, aircraft_id: &str, new_base: &str) -> Result<(), CommandError> {
        let index = self.player_aircraft_index(aircraft_id)?;
        if self.aircraft[index].status != AircraftStatus::Landed {
            return Err(CommandError::NotLanded(aircraft_id.to_string()));
        }
        let airport = self.airport(new_base)?.clone();
        let grounded_until = self.time_hours() + self.config.events.grounding_hours;
        let aircraft = &mut self.aircraft[index];
        aircraft.home_base = airport.code.clone();
        aircraft.origin = airport.code.clone();
        aircraft.destination = airport.code.clone();
        aircraft.position = airport.position;
        aircraft.progress = 1.0;
        aircraft.schedule.clear();
        aircraft.current_leg = None;
        aircraft.status = AircraftStatus::Grounded;
        aircraft.grounded_until = Some(grounded_until);
        self.refresh_hub_tiers();
        info!(aircraft = %aircraft_id, base = %airport.code, "aircraft rebased");
        Ok(())
    }

    pub fn install_upgrade(&mut self, aircraft_id: &str, upgrade: Upgrade) -> Result<(), CommandError> {
        let index = self.player_aircraft_index(aircraft_id)?;
        if self.aircraft[index].upgrades.has(upgrade) {
            return Err(CommandError::UpgradeInstalled(upgrade.label()));
        }
        let economy = &self.config.economy;
        let cost = match upgrade {
            Upgrade::Ife => economy.ife_cost,
            Upgrade::Wifi => economy.wifi_cost,
            Upgrade::MealService => economy.meal_service_cost,
        };
        self.ensure_cash(cost)?;
        self.ledger.spend(cost);
        self.aircraft[index].upgrades.install(upgrade);
        info!(aircraft = %aircraft_id, upgrade = upgrade.label(), cost, "upgrade installed");
        Ok(())
    }

    /// Hires one member of `role` for a signing cost of one day's wage.
    /// Returns the new id, or `None` for engineers, who are only counted.
    pub fn hire_staff(&mut self, role: StaffRole) -> Result<Option<String>, CommandError> {
        let cost = role.daily_rate(&self.config.staff);
        self.ensure_cash(cost)?;
        self.ledger.spend(cost);
        let id = self.staff.hire(role, &mut self.ids);
        info!(?role, id = ?id, cost, "staff hired");
        Ok(id)
    }

    /// Posts pilots and cabin crew to a player aircraft and dispatchers to an
    /// airport.
    pub fn assign_staff(&mut self, staff_id: &str, target: &str) -> Result<(), CommandError> {
        let role = self
            .staff
            .member(staff_id)
            .map(|m| m.role)
            .ok_or_else(|| CommandError::UnknownStaff(staff_id.to_string()))?;
        let valid = match role {
            StaffRole::Pilot | StaffRole::CabinCrew => self.player_aircraft_index(target).is_ok(),
            StaffRole::Dispatcher => self.airports.contains_key(target),
            StaffRole::Engineer => false,
        };
        if !valid {
            return Err(CommandError::InvalidPosting {
                staff: staff_id.to_string(),
                target: target.to_string(),
            });
        }
        self.staff.assign(staff_id, target);
        Ok(())
    }

    pub fn unassign_staff(&mut self, staff_id: &str) -> Result<(), CommandError> {
        if self.staff.unassign(staff_id) {
            Ok(())
        } else {
            Err(CommandError::UnknownStaff(staff_id.to_string()))
        }
    }

    pub fn launch_campaign(&mut self, origin: &str, destination: &str) -> Result<(), CommandError> {
        if self.route(origin, destination).is_err() {
            return Err(CommandError::NoDirectRoute {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }
        let key = route_key(origin, destination);
        if demand::campaign_active(self, &key) {
            return Err(CommandError::CampaignActive(key));
        }
        let economy = &self.config.economy;
        let (cost, hours) = (economy.campaign_cost, economy.campaign_hours);
        self.ensure_cash(cost)?;
        self.ledger.spend(cost);
        self.campaigns.push(MarketingCampaign {
            route_key: key.clone(),
            expires_at: self.time_hours() + hours,
        });
        info!(route = %key, cost, "marketing campaign launched");
        Ok(())
    }

    /// Freezes every schedule until the next week starts. Only allowed on the
    /// first day of the cycle.
    pub fn lock_schedules(&mut self) -> Result<(), CommandError> {
        let day = self.day_of_cycle();
        if day != 1 {
            return Err(CommandError::LockOutsidePlanningDay { day });
        }
        self.schedules_locked = true;
        info!(week = self.week(), "schedules locked");
        Ok(())
    }
}
