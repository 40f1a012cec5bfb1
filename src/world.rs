use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    config::{Difficulty, SimConfig},
    error::SimError,
    geo::{self, GeoPoint},
    ids::IdAllocator,
    market::competitors::AiMarket,
    staff::StaffRoster,
};

pub const GLOBAL_TARGET: &str = "GLOBAL";

pub fn route_key(origin: &str, destination: &str) -> String {
    format!("{origin}-{destination}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubTier {
    #[default]
    None,
    Small,
    Large,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub position: GeoPoint,
    pub radar_covered: bool,
    pub hub_tier: HubTier,
    pub ai_hub: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftType {
    pub code: String,
    pub name: String,
    pub range_nm: f64,
    pub speed_kts: f64,
    pub capacity: u32,
    pub cost: f64,
    pub fuel_per_nm: f64,
    pub maintenance_per_nm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Evening,
}

impl TimeBucket {
    pub fn from_hour(hour: f64) -> Self {
        let time_of_day = hour.rem_euclid(24.0);
        if time_of_day < 12.0 {
            TimeBucket::Morning
        } else if time_of_day < 18.0 {
            TimeBucket::Afternoon
        } else {
            TimeBucket::Evening
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandProfile {
    pub morning: f64,
    pub afternoon: f64,
    pub evening: f64,
}

impl DemandProfile {
    pub fn fraction(&self, bucket: TimeBucket) -> f64 {
        match bucket {
            TimeBucket::Morning => self.morning,
            TimeBucket::Afternoon => self.afternoon,
            TimeBucket::Evening => self.evening,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDemand {
    pub origin: String,
    pub destination: String,
    pub demand: DemandProfile,
    pub duration_hours: f64,
}

impl RouteDemand {
    pub fn key(&self) -> String {
        route_key(&self.origin, &self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Airline {
    Player,
    Ai(String),
}

impl Airline {
    pub fn is_player(&self) -> bool {
        matches!(self, Airline::Player)
    }

    pub fn code(&self) -> &str {
        match self {
            Airline::Player => "PLAYER",
            Airline::Ai(code) => code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AircraftStatus {
    Landed,
    InFlight,
    Grounded,
    Repositioning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    Ife,
    Wifi,
    MealService,
}

impl Upgrade {
    pub fn label(self) -> &'static str {
        match self {
            Upgrade::Ife => "in-flight entertainment",
            Upgrade::Wifi => "connectivity",
            Upgrade::MealService => "meal service",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub ife: bool,
    pub wifi: bool,
    pub meal_service: bool,
}

impl Upgrades {
    pub fn count(&self) -> u32 {
        u32::from(self.ife) + u32::from(self.wifi) + u32::from(self.meal_service)
    }

    pub fn has(&self, upgrade: Upgrade) -> bool {
        match upgrade {
            Upgrade::Ife => self.ife,
            Upgrade::Wifi => self.wifi,
            Upgrade::MealService => self.meal_service,
        }
    }

    pub fn install(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::Ife => self.ife = true,
            Upgrade::Wifi => self.wifi = true,
            Upgrade::MealService => self.meal_service = true,
        }
    }
}

/// One scheduled flight in an aircraft's daily rotation. Times are hours from
/// the start of the operating day; `arrival` is the scheduled arrival and the
/// effective times add the day's accumulated `delay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub origin: String,
    pub destination: String,
    pub departure: f64,
    pub arrival: f64,
    pub duration: f64,
    pub fare: f64,
    #[serde(default)]
    pub delay: f64,
    /// Cancelled for the rest of the day after weather pushed it past the horizon.
    #[serde(default)]
    pub cancelled: bool,
    /// Weather at the origin has already been applied to this leg today.
    #[serde(default)]
    pub weather_checked: bool,
}

impl FlightLeg {
    pub fn new(origin: &str, destination: &str, departure: f64, duration: f64, fare: f64) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure,
            arrival: departure + duration,
            duration,
            fare,
            delay: 0.0,
            cancelled: false,
            weather_checked: false,
        }
    }

    pub fn effective_departure(&self) -> f64 {
        self.departure + self.delay
    }

    pub fn effective_arrival(&self) -> f64 {
        self.arrival + self.delay
    }

    pub fn route_key(&self) -> String {
        route_key(&self.origin, &self.destination)
    }

    pub fn in_window(&self, hour: f64) -> bool {
        !self.cancelled && self.effective_departure() <= hour && hour < self.effective_arrival()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub fuel: f64,
    pub maintenance: f64,
    pub staff: f64,
    pub meals: f64,
    pub rival_hub: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedFlightLeg {
    pub origin: String,
    pub destination: String,
    pub miles: f64,
    pub passengers: u32,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub timestamp: f64,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: String,
    pub name: String,
    pub airline: Airline,
    pub type_code: String,
    pub origin: String,
    pub destination: String,
    pub position: GeoPoint,
    pub heading: f64,
    pub progress: f64,
    pub status: AircraftStatus,
    pub home_base: String,
    pub schedule: Vec<FlightLeg>,
    pub history: Vec<CompletedFlightLeg>,
    pub upgrades: Upgrades,
    pub grounded_until: Option<f64>,
    /// Copy of the leg being flown, settled on landing.
    pub current_leg: Option<FlightLeg>,
    /// Day on which the last fault event grounded this aircraft.
    #[serde(default)]
    pub last_fault_day: Option<u32>,
}

impl Aircraft {
    pub fn landed_at(id: String, name: String, airline: Airline, type_code: &str, base: &Airport) -> Self {
        Self {
            id,
            name,
            airline,
            type_code: type_code.to_string(),
            origin: base.code.clone(),
            destination: base.code.clone(),
            position: base.position,
            heading: 0.0,
            progress: 1.0,
            status: AircraftStatus::Landed,
            home_base: base.code.clone(),
            schedule: Vec::new(),
            history: Vec::new(),
            upgrades: Upgrades::default(),
            grounded_until: None,
            current_leg: None,
            last_fault_day: None,
        }
    }

    /// Airport the aircraft is parked at, or heading to when airborne.
    pub fn location(&self) -> &str {
        &self.destination
    }

    pub fn is_player(&self) -> bool {
        self.airline.is_player()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStats {
    pub satisfaction: f64,
    pub flights: u32,
}

/// Player satisfaction per route. Entries are created on first use and the
/// score is clamped to [0, 100] on every update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteLedger {
    stats: BTreeMap<String, RouteStats>,
}

impl RouteLedger {
    pub fn get(&self, key: &str) -> Option<&RouteStats> {
        self.stats.get(key)
    }

    pub fn satisfaction_or(&self, key: &str, default: f64) -> f64 {
        self.stats.get(key).map(|s| s.satisfaction).unwrap_or(default)
    }

    pub fn record(&mut self, key: &str, delta: f64, flights: u32, initial: f64) -> RouteStats {
        let entry = self.stats.entry(key.to_string()).or_insert(RouteStats {
            satisfaction: initial.clamp(0.0, 100.0),
            flights: 0,
        });
        let delta = if delta.is_finite() { delta } else { 0.0 };
        entry.satisfaction = (entry.satisfaction + delta).clamp(0.0, 100.0);
        entry.flights = entry.flights.saturating_add(flights);
        *entry
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RouteStats)> {
        self.stats.iter()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Fault,
    Strike,
    Weather,
    Concert,
    Sports,
    Conference,
    FuelPriceChange,
}

impl EventKind {
    pub fn boosts_demand(self) -> bool {
        matches!(self, EventKind::Concert | EventKind::Sports | EventKind::Conference)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    /// Aircraft id, airport code, or [`GLOBAL_TARGET`].
    pub target: String,
    pub value: f64,
    pub day: u32,
    pub probability: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingCampaign {
    pub route_key: String,
    pub expires_at: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnservedOpportunity {
    pub route_key: String,
    pub passengers_missed: u32,
    pub potential_revenue: f64,
    pub aircraft_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub cash: f64,
    pub cash_at_week_start: f64,
    pub daily_pnl: BTreeMap<u32, f64>,
    pub unserved: Vec<UnservedOpportunity>,
}

impl Ledger {
    /// Capital spending: leaves the daily P&L untouched.
    pub fn spend(&mut self, amount: f64) {
        self.cash -= amount;
    }

    pub fn book(&mut self, day_of_cycle: u32, amount: f64) {
        if !amount.is_finite() || amount == 0.0 {
            return;
        }
        self.cash += amount;
        *self.daily_pnl.entry(day_of_cycle).or_insert(0.0) += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteProfit {
    pub route_key: String,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPnl {
    pub day: u32,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnservedSummary {
    pub route_key: String,
    pub passengers_missed: u32,
    pub potential_revenue: f64,
    pub occurrences: u32,
    pub aircraft_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSatisfaction {
    pub route_key: String,
    pub satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub week: u32,
    pub top_routes: Vec<RouteProfit>,
    pub daily_pnl: Vec<DailyPnl>,
    pub unserved: Vec<UnservedSummary>,
    pub satisfaction: Vec<RouteSatisfaction>,
}

/// Everything the presentation layer is told about, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    DailyEvents { day: u32, events: Vec<GameEvent> },
    WeeklyForecast { week: u32, events: Vec<GameEvent> },
    WeeklyReport(WeeklyReport),
    SimulationError { message: String },
}

/// Result of one landed leg, folded into the ledgers by bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSettlement {
    pub aircraft_id: String,
    pub route_key: String,
    pub profit: f64,
    pub satisfaction_delta: Option<f64>,
    pub unserved: Option<UnservedOpportunity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedAircraft {
    pub aircraft_id: String,
    pub reason: String,
}

/// Per-step scratch space, drained by the engine after every step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub skipped: Vec<SkippedAircraft>,
    pub departures: usize,
    pub landings: usize,
}

#[derive(Debug, Serialize)]
pub struct AircraftSnapshot {
    pub id: String,
    pub name: String,
    pub airline: String,
    pub type_code: String,
    pub origin: String,
    pub destination: String,
    pub position: GeoPoint,
    pub heading: f64,
    pub progress: f64,
    pub status: AircraftStatus,
    pub home_base: String,
    pub scheduled_legs: usize,
}

#[derive(Debug, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub time_hours: f64,
    pub day: u32,
    pub day_of_cycle: u32,
    pub cash: f64,
    pub fuel_multiplier: f64,
    pub schedules_locked: bool,
    pub aircraft: Vec<AircraftSnapshot>,
    pub airports: Vec<Airport>,
    pub events: Vec<GameEvent>,
    pub forecast: Vec<GameEvent>,
    pub route_stats: Vec<RouteSatisfaction>,
}

pub struct World {
    time_hours: f64,
    pub(crate) difficulty: Difficulty,
    pub(crate) config: SimConfig,
    pub(crate) airports: BTreeMap<String, Airport>,
    pub(crate) aircraft_types: BTreeMap<String, AircraftType>,
    pub(crate) routes: Vec<RouteDemand>,
    route_index: HashMap<String, usize>,
    pub(crate) airline_codes: Vec<String>,
    pub(crate) aircraft: Vec<Aircraft>,
    pub(crate) staff: StaffRoster,
    pub(crate) ids: IdAllocator,
    pub(crate) daily_events: Vec<GameEvent>,
    pub(crate) forecast: Vec<GameEvent>,
    pub(crate) fuel_multiplier: f64,
    pub(crate) schedules_locked: bool,
    pub(crate) campaigns: Vec<MarketingCampaign>,
    pub(crate) route_stats: RouteLedger,
    pub(crate) ai: AiMarket,
    pub(crate) ledger: Ledger,
    pub(crate) pending: Vec<PendingSettlement>,
    /// Staff ids owed one flight of experience.
    pub(crate) staff_credits: Vec<String>,
    pub(crate) pause_requested: bool,
    pub(crate) tick_report: TickReport,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) last_report: Option<WeeklyReport>,
}

impl World {
    pub fn new(config: SimConfig, difficulty: Difficulty, start_hour: f64, cash: f64) -> Self {
        Self {
            time_hours: start_hour,
            difficulty,
            config,
            airports: BTreeMap::new(),
            aircraft_types: BTreeMap::new(),
            routes: Vec::new(),
            route_index: HashMap::new(),
            airline_codes: Vec::new(),
            aircraft: Vec::new(),
            staff: StaffRoster::default(),
            ids: IdAllocator::new(),
            daily_events: Vec::new(),
            forecast: Vec::new(),
            fuel_multiplier: 1.0,
            schedules_locked: false,
            campaigns: Vec::new(),
            route_stats: RouteLedger::default(),
            ai: AiMarket::default(),
            ledger: Ledger {
                cash,
                cash_at_week_start: cash,
                ..Ledger::default()
            },
            pending: Vec::new(),
            staff_credits: Vec::new(),
            pause_requested: false,
            tick_report: TickReport::default(),
            notifications: Vec::new(),
            last_report: None,
        }
    }

    pub fn add_airport(&mut self, code: &str, name: &str, position: GeoPoint, radar_covered: bool) {
        self.airports.insert(
            code.to_string(),
            Airport {
                code: code.to_string(),
                name: name.to_string(),
                position,
                radar_covered,
                hub_tier: HubTier::None,
                ai_hub: None,
            },
        );
    }

    pub fn add_aircraft_type(&mut self, aircraft_type: AircraftType) {
        self.aircraft_types
            .insert(aircraft_type.code.clone(), aircraft_type);
    }

    pub fn add_route(&mut self, route: RouteDemand) {
        let key = route.key();
        match self.route_index.get(&key) {
            Some(&index) => self.routes[index] = route,
            None => {
                self.route_index.insert(key, self.routes.len());
                self.routes.push(route);
            }
        }
    }

    pub fn set_airline_codes(&mut self, codes: Vec<String>) {
        self.airline_codes = codes;
    }

    pub fn time_hours(&self) -> f64 {
        self.time_hours
    }

    pub fn advance_time(&mut self, dt_hours: f64) {
        self.time_hours += dt_hours;
    }

    pub fn day(&self) -> u32 {
        day_of(self.time_hours)
    }

    pub fn day_of_cycle(&self) -> u32 {
        cycle_day_of(self.time_hours)
    }

    pub fn week(&self) -> u32 {
        (self.day() - 1) / 7 + 1
    }

    pub fn time_of_day(&self) -> f64 {
        self.time_hours.rem_euclid(24.0)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn cash(&self) -> f64 {
        self.ledger.cash
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn fuel_multiplier(&self) -> f64 {
        self.fuel_multiplier
    }

    pub fn schedules_locked(&self) -> bool {
        self.schedules_locked
    }

    pub fn airport(&self, code: &str) -> Result<&Airport, SimError> {
        self.airports
            .get(code)
            .ok_or_else(|| SimError::UnknownAirport(code.to_string()))
    }

    pub fn airports(&self) -> impl Iterator<Item = &Airport> {
        self.airports.values()
    }

    pub fn aircraft_type(&self, code: &str) -> Result<&AircraftType, SimError> {
        self.aircraft_types
            .get(code)
            .ok_or_else(|| SimError::UnknownAircraftType(code.to_string()))
    }

    pub fn route(&self, origin: &str, destination: &str) -> Result<&RouteDemand, SimError> {
        let key = route_key(origin, destination);
        self.route_index
            .get(&key)
            .and_then(|&index| self.routes.get(index))
            .ok_or(SimError::UnknownRoute(key))
    }

    pub fn routes(&self) -> &[RouteDemand] {
        &self.routes
    }

    pub fn routes_from(&self, origin: &str) -> Vec<&RouteDemand> {
        self.routes
            .iter()
            .filter(|route| route.origin == origin)
            .collect()
    }

    pub fn distance_between(&self, origin: &str, destination: &str) -> Result<f64, SimError> {
        let from = self.airport(origin)?;
        let to = self.airport(destination)?;
        Ok(geo::distance_nm(from.position, to.position))
    }

    pub fn aircraft(&self, id: &str) -> Result<&Aircraft, SimError> {
        self.aircraft
            .iter()
            .find(|ac| ac.id == id)
            .ok_or_else(|| SimError::UnknownAircraft(id.to_string()))
    }

    pub fn aircraft_mut(&mut self, id: &str) -> Result<&mut Aircraft, SimError> {
        self.aircraft
            .iter_mut()
            .find(|ac| ac.id == id)
            .ok_or_else(|| SimError::UnknownAircraft(id.to_string()))
    }

    /// Parks a new player aircraft at `base` and returns its id.
    pub fn spawn_player_aircraft(&mut self, type_code: &str, base: &str, name: Option<&str>) -> Result<String, SimError> {
        self.aircraft_type(type_code)?;
        let airport = self.airport(base)?.clone();
        let id = self.ids.next_player_aircraft();
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| id.clone(), str::to_string);
        self.aircraft
            .push(Aircraft::landed_at(id.clone(), name, Airline::Player, type_code, &airport));
        Ok(id)
    }

    pub fn fleet(&self) -> &[Aircraft] {
        &self.aircraft
    }

    pub fn player_fleet(&self) -> impl Iterator<Item = &Aircraft> {
        self.aircraft.iter().filter(|ac| ac.is_player())
    }

    pub fn staff(&self) -> &StaffRoster {
        &self.staff
    }

    pub fn daily_events(&self) -> &[GameEvent] {
        &self.daily_events
    }

    pub fn daily_events_mut(&mut self) -> &mut Vec<GameEvent> {
        &mut self.daily_events
    }

    pub fn forecast(&self) -> &[GameEvent] {
        &self.forecast
    }

    pub fn campaigns(&self) -> &[MarketingCampaign] {
        &self.campaigns
    }

    pub fn route_stats(&self) -> &RouteLedger {
        &self.route_stats
    }

    pub fn ai_market(&self) -> &AiMarket {
        &self.ai
    }

    pub fn tick_report(&self) -> &TickReport {
        &self.tick_report
    }

    pub fn last_report(&self) -> Option<&WeeklyReport> {
        self.last_report.as_ref()
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Recomputes hub tiers from the number of player aircraft based at each airport.
    pub fn refresh_hub_tiers(&mut self) {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for ac in self.aircraft.iter().filter(|ac| ac.is_player()) {
            *counts.entry(ac.home_base.as_str()).or_insert(0) += 1;
        }
        let economy = &self.config.economy;
        for airport in self.airports.values_mut() {
            let count = counts.get(airport.code.as_str()).copied().unwrap_or(0);
            airport.hub_tier = if count >= economy.large_hub_min_aircraft {
                HubTier::Large
            } else if count >= economy.small_hub_min_aircraft {
                HubTier::Small
            } else {
                HubTier::None
            };
        }
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        let aircraft = self
            .aircraft
            .iter()
            .map(|ac| AircraftSnapshot {
                id: ac.id.clone(),
                name: ac.name.clone(),
                airline: ac.airline.code().to_string(),
                type_code: ac.type_code.clone(),
                origin: ac.origin.clone(),
                destination: ac.destination.clone(),
                position: ac.position,
                heading: ac.heading,
                progress: ac.progress,
                status: ac.status,
                home_base: ac.home_base.clone(),
                scheduled_legs: ac.schedule.len(),
            })
            .collect();
        let route_stats = self
            .route_stats
            .iter()
            .map(|(key, stats)| RouteSatisfaction {
                route_key: key.clone(),
                satisfaction: stats.satisfaction,
            })
            .collect();
        WorldSnapshot {
            scenario: scenario.to_string(),
            time_hours: self.time_hours,
            day: self.day(),
            day_of_cycle: self.day_of_cycle(),
            cash: self.ledger.cash,
            fuel_multiplier: self.fuel_multiplier,
            schedules_locked: self.schedules_locked,
            aircraft,
            airports: self.airports.values().cloned().collect(),
            events: self.daily_events.clone(),
            forecast: self.forecast.clone(),
            route_stats,
        }
    }
}

pub fn day_of(time_hours: f64) -> u32 {
    (time_hours / 24.0).floor().max(0.0) as u32 + 1
}

pub fn cycle_day_of(time_hours: f64) -> u32 {
    (day_of(time_hours) - 1) % 7 + 1
}
