use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{config::StaffConfig, ids::IdAllocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Pilot,
    Engineer,
    Dispatcher,
    CabinCrew,
}

impl StaffRole {
    pub fn daily_rate(self, config: &StaffConfig) -> f64 {
        match self {
            StaffRole::Pilot => config.pilot_daily_rate,
            StaffRole::Engineer => config.engineer_daily_rate,
            StaffRole::Dispatcher => config.dispatcher_daily_rate,
            StaffRole::CabinCrew => config.cabin_crew_daily_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub role: StaffRole,
    pub level: u8,
    pub flights: u32,
    /// Aircraft id for pilots and cabin crew, airport code for dispatchers.
    pub assignment: Option<String>,
}

impl StaffMember {
    fn new(id: String, role: StaffRole) -> Self {
        Self {
            id,
            role,
            level: 1,
            flights: 0,
            assignment: None,
        }
    }
}

pub fn skill_multiplier(level: u8, config: &StaffConfig) -> f64 {
    1.0 + f64::from(level.saturating_sub(1)) * config.level_step
}

/// Factor applied to a risk or delay by a skilled member: `1 - base * skill`,
/// never negative.
pub fn mitigation(base: f64, level: u8, config: &StaffConfig) -> f64 {
    (1.0 - base * skill_multiplier(level, config)).max(0.0)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffRoster {
    members: Vec<StaffMember>,
    engineers: u32,
}

impl StaffRoster {
    /// Adds one member of `role`. Engineers are only counted and get no id.
    pub fn hire(&mut self, role: StaffRole, ids: &mut IdAllocator) -> Option<String> {
        let id = match role {
            StaffRole::Engineer => {
                self.engineers += 1;
                return None;
            }
            StaffRole::Pilot => ids.next_pilot(),
            StaffRole::Dispatcher => ids.next_dispatcher(),
            StaffRole::CabinCrew => ids.next_cabin_crew(),
        };
        self.members.push(StaffMember::new(id.clone(), role));
        Some(id)
    }

    pub fn engineers(&self) -> u32 {
        self.engineers
    }

    pub fn members(&self) -> &[StaffMember] {
        &self.members
    }

    pub fn member(&self, id: &str) -> Option<&StaffMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn count(&self, role: StaffRole) -> u32 {
        match role {
            StaffRole::Engineer => self.engineers,
            _ => self.members.iter().filter(|m| m.role == role).count() as u32,
        }
    }

    /// Assigns a member, displacing anyone of the same role already on that target.
    pub fn assign(&mut self, id: &str, target: &str) -> bool {
        let Some(role) = self.member(id).map(|m| m.role) else {
            return false;
        };
        for member in self.members.iter_mut() {
            if member.role == role && member.id != id && member.assignment.as_deref() == Some(target) {
                member.assignment = None;
            }
        }
        if let Some(member) = self.members.iter_mut().find(|m| m.id == id) {
            member.assignment = Some(target.to_string());
        }
        true
    }

    pub fn unassign(&mut self, id: &str) -> bool {
        match self.members.iter_mut().find(|m| m.id == id) {
            Some(member) => {
                member.assignment = None;
                true
            }
            None => false,
        }
    }

    pub fn assigned(&self, role: StaffRole, target: &str) -> Option<&StaffMember> {
        self.members
            .iter()
            .find(|m| m.role == role && m.assignment.as_deref() == Some(target))
    }

    pub fn daily_wages(&self, config: &StaffConfig) -> f64 {
        let members: f64 = self
            .members
            .iter()
            .map(|m| m.role.daily_rate(config))
            .sum();
        members + f64::from(self.engineers) * config.engineer_daily_rate
    }

    /// Counts one flight for `id` and rolls for promotion. Returns the new level
    /// when the member levelled up.
    pub fn credit_flight(&mut self, id: &str, config: &StaffConfig, rng: &mut impl Rng) -> Option<u8> {
        let member = self.members.iter_mut().find(|m| m.id == id)?;
        member.flights = member.flights.saturating_add(1);
        let roll: f64 = rng.gen();
        if member.level >= config.max_level {
            return None;
        }
        let periodic = config.level_up_every_flights > 0
            && member.flights % config.level_up_every_flights == 0;
        if periodic || roll < config.level_up_chance {
            member.level += 1;
            Some(member.level)
        } else {
            None
        }
    }
}
