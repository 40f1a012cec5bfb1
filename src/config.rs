//! Tunable constants for the market, economics and event models.
//!
//! Every field has a serde default so a scenario only needs to spell out the
//! values it wants to change.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Scales the chance of every random disruption and forecast event.
    pub fn event_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.9,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.1,
        }
    }

    /// Scales the satisfaction earned per completed leg.
    pub fn satisfaction_modifier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub staff: StaffConfig,
    #[serde(default)]
    pub events: EventConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            economy: EconomyConfig::default(),
            staff: StaffConfig::default(),
            events: EventConfig::default(),
            planner: PlannerConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Latest arrival, in hours from the start of the operating day.
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: f64,
    #[serde(default = "default_start_hour")]
    pub day_start_hour: f64,
    /// Time of day at which stranded aircraft fly home.
    #[serde(default = "default_reposition_hour")]
    pub reposition_hour: f64,
    #[serde(default = "default_competition_window")]
    pub competition_window_hours: f64,
    #[serde(default = "default_long_leg_hours")]
    pub long_leg_hours: f64,
    #[serde(default = "default_long_turnaround")]
    pub long_turnaround_minutes: f64,
    #[serde(default = "default_short_turnaround")]
    pub short_turnaround_minutes: f64,
    #[serde(default = "default_fare_min")]
    pub fare_min: f64,
    #[serde(default = "default_fare_max")]
    pub fare_max: f64,
}

fn default_horizon_hours() -> f64 {
    26.0
}
fn default_start_hour() -> f64 {
    6.0
}
fn default_reposition_hour() -> f64 {
    2.0
}
fn default_competition_window() -> f64 {
    2.0
}
fn default_long_leg_hours() -> f64 {
    2.0
}
fn default_long_turnaround() -> f64 {
    50.0
}
fn default_short_turnaround() -> f64 {
    30.0
}
fn default_fare_min() -> f64 {
    0.8
}
fn default_fare_max() -> f64 {
    1.2
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            horizon_hours: default_horizon_hours(),
            day_start_hour: default_start_hour(),
            reposition_hour: default_reposition_hour(),
            competition_window_hours: default_competition_window(),
            long_leg_hours: default_long_leg_hours(),
            long_turnaround_minutes: default_long_turnaround(),
            short_turnaround_minutes: default_short_turnaround(),
            fare_min: default_fare_min(),
            fare_max: default_fare_max(),
        }
    }
}

impl ScheduleConfig {
    /// Minimum ground time after a leg of the given duration, in hours.
    pub fn turnaround_hours(&self, leg_duration_hours: f64) -> f64 {
        let minutes = if leg_duration_hours > self.long_leg_hours {
            self.long_turnaround_minutes
        } else {
            self.short_turnaround_minutes
        };
        minutes / 60.0
    }

    pub fn fare_in_range(&self, fare: f64) -> bool {
        fare.is_finite() && fare >= self.fare_min - 1e-9 && fare <= self.fare_max + 1e-9
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default = "default_revenue_per_mile")]
    pub revenue_per_passenger_mile: f64,
    #[serde(default = "default_maintenance_multiplier")]
    pub maintenance_multiplier: f64,
    #[serde(default = "default_meal_cost")]
    pub meal_cost_per_passenger: f64,
    #[serde(default = "default_fare_elasticity")]
    pub fare_elasticity: f64,
    #[serde(default = "default_large_hub_demand")]
    pub large_hub_demand_bonus: f64,
    #[serde(default = "default_small_hub_demand")]
    pub small_hub_demand_bonus: f64,
    #[serde(default = "default_large_hub_fuel")]
    pub large_hub_fuel_factor: f64,
    #[serde(default = "default_small_hub_fuel")]
    pub small_hub_fuel_factor: f64,
    #[serde(default = "default_large_hub_aircraft")]
    pub large_hub_min_aircraft: usize,
    #[serde(default = "default_small_hub_aircraft")]
    pub small_hub_min_aircraft: usize,
    #[serde(default = "default_rival_hub_factor")]
    pub rival_hub_profit_factor: f64,
    #[serde(default = "default_amenity_score")]
    pub amenity_score_bonus: f64,
    #[serde(default = "default_price_pivot")]
    pub price_score_pivot: f64,
    #[serde(default = "default_price_weight")]
    pub price_score_weight: f64,
    #[serde(default = "default_satisfaction")]
    pub default_satisfaction: f64,
    #[serde(default = "default_fare_satisfaction")]
    pub fare_satisfaction_weight: f64,
    #[serde(default = "default_amenity_satisfaction")]
    pub amenity_satisfaction_bonus: f64,
    #[serde(default = "default_campaign_cost")]
    pub campaign_cost: f64,
    #[serde(default = "default_campaign_boost")]
    pub campaign_boost: f64,
    #[serde(default = "default_campaign_hours")]
    pub campaign_hours: f64,
    #[serde(default = "default_ife_cost")]
    pub ife_cost: f64,
    #[serde(default = "default_wifi_cost")]
    pub wifi_cost: f64,
    #[serde(default = "default_meal_upgrade_cost")]
    pub meal_service_cost: f64,
}

fn default_revenue_per_mile() -> f64 {
    0.22
}
fn default_maintenance_multiplier() -> f64 {
    1.2
}
fn default_meal_cost() -> f64 {
    15.0
}
fn default_fare_elasticity() -> f64 {
    1.5
}
fn default_large_hub_demand() -> f64 {
    0.25
}
fn default_small_hub_demand() -> f64 {
    0.10
}
fn default_large_hub_fuel() -> f64 {
    0.85
}
fn default_small_hub_fuel() -> f64 {
    0.95
}
fn default_large_hub_aircraft() -> usize {
    5
}
fn default_small_hub_aircraft() -> usize {
    2
}
fn default_rival_hub_factor() -> f64 {
    0.9
}
fn default_amenity_score() -> f64 {
    5.0
}
fn default_price_pivot() -> f64 {
    1.1
}
fn default_price_weight() -> f64 {
    20.0
}
fn default_satisfaction() -> f64 {
    50.0
}
fn default_fare_satisfaction() -> f64 {
    5.0
}
fn default_amenity_satisfaction() -> f64 {
    0.5
}
fn default_campaign_cost() -> f64 {
    50_000.0
}
fn default_campaign_boost() -> f64 {
    1.25
}
fn default_campaign_hours() -> f64 {
    24.0
}
fn default_ife_cost() -> f64 {
    250_000.0
}
fn default_wifi_cost() -> f64 {
    150_000.0
}
fn default_meal_upgrade_cost() -> f64 {
    50_000.0
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            revenue_per_passenger_mile: default_revenue_per_mile(),
            maintenance_multiplier: default_maintenance_multiplier(),
            meal_cost_per_passenger: default_meal_cost(),
            fare_elasticity: default_fare_elasticity(),
            large_hub_demand_bonus: default_large_hub_demand(),
            small_hub_demand_bonus: default_small_hub_demand(),
            large_hub_fuel_factor: default_large_hub_fuel(),
            small_hub_fuel_factor: default_small_hub_fuel(),
            large_hub_min_aircraft: default_large_hub_aircraft(),
            small_hub_min_aircraft: default_small_hub_aircraft(),
            rival_hub_profit_factor: default_rival_hub_factor(),
            amenity_score_bonus: default_amenity_score(),
            price_score_pivot: default_price_pivot(),
            price_score_weight: default_price_weight(),
            default_satisfaction: default_satisfaction(),
            fare_satisfaction_weight: default_fare_satisfaction(),
            amenity_satisfaction_bonus: default_amenity_satisfaction(),
            campaign_cost: default_campaign_cost(),
            campaign_boost: default_campaign_boost(),
            campaign_hours: default_campaign_hours(),
            ife_cost: default_ife_cost(),
            wifi_cost: default_wifi_cost(),
            meal_service_cost: default_meal_upgrade_cost(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffConfig {
    #[serde(default = "default_pilot_rate")]
    pub pilot_daily_rate: f64,
    #[serde(default = "default_engineer_rate")]
    pub engineer_daily_rate: f64,
    #[serde(default = "default_dispatcher_rate")]
    pub dispatcher_daily_rate: f64,
    #[serde(default = "default_crew_rate")]
    pub cabin_crew_daily_rate: f64,
    /// Hours of duty the daily rate pays for when prorated onto a leg.
    #[serde(default = "default_shift_hours")]
    pub shift_hours: f64,
    #[serde(default = "default_max_level")]
    pub max_level: u8,
    #[serde(default = "default_level_every")]
    pub level_up_every_flights: u32,
    #[serde(default = "default_level_chance")]
    pub level_up_chance: f64,
    #[serde(default = "default_level_step")]
    pub level_step: f64,
    #[serde(default = "default_crew_bonus")]
    pub cabin_crew_demand_bonus: f64,
    #[serde(default = "default_weather_reduction")]
    pub weather_delay_reduction: f64,
    #[serde(default = "default_fault_reduction")]
    pub pilot_fault_reduction: f64,
    #[serde(default = "default_strike_reduction")]
    pub dispatcher_strike_reduction: f64,
    #[serde(default = "default_engineer_reduction")]
    pub engineer_fault_reduction: f64,
}

fn default_pilot_rate() -> f64 {
    12_000.0
}
fn default_engineer_rate() -> f64 {
    10_000.0
}
fn default_dispatcher_rate() -> f64 {
    8_000.0
}
fn default_crew_rate() -> f64 {
    6_000.0
}
fn default_shift_hours() -> f64 {
    8.0
}
fn default_max_level() -> u8 {
    5
}
fn default_level_every() -> u32 {
    250
}
fn default_level_chance() -> f64 {
    1.0 / 500.0
}
fn default_level_step() -> f64 {
    0.2
}
fn default_crew_bonus() -> f64 {
    0.15
}
fn default_weather_reduction() -> f64 {
    0.4
}
fn default_fault_reduction() -> f64 {
    0.5
}
fn default_strike_reduction() -> f64 {
    0.5
}
fn default_engineer_reduction() -> f64 {
    0.05
}

impl Default for StaffConfig {
    fn default() -> Self {
        Self {
            pilot_daily_rate: default_pilot_rate(),
            engineer_daily_rate: default_engineer_rate(),
            dispatcher_daily_rate: default_dispatcher_rate(),
            cabin_crew_daily_rate: default_crew_rate(),
            shift_hours: default_shift_hours(),
            max_level: default_max_level(),
            level_up_every_flights: default_level_every(),
            level_up_chance: default_level_chance(),
            level_step: default_level_step(),
            cabin_crew_demand_bonus: default_crew_bonus(),
            weather_delay_reduction: default_weather_reduction(),
            pilot_fault_reduction: default_fault_reduction(),
            dispatcher_strike_reduction: default_strike_reduction(),
            engineer_fault_reduction: default_engineer_reduction(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default = "default_positive_chance")]
    pub positive_event_chance: f64,
    #[serde(default = "default_positive_min")]
    pub positive_multiplier_min: f64,
    #[serde(default = "default_positive_max")]
    pub positive_multiplier_max: f64,
    #[serde(default = "default_weather_chance")]
    pub weather_warning_chance: f64,
    #[serde(default = "default_weather_prob_min")]
    pub weather_probability_min: f64,
    #[serde(default = "default_weather_prob_max")]
    pub weather_probability_max: f64,
    #[serde(default = "default_weather_delay_min")]
    pub weather_delay_min: f64,
    #[serde(default = "default_weather_delay_max")]
    pub weather_delay_max: f64,
    #[serde(default = "default_fuel_chance")]
    pub fuel_shock_chance: f64,
    #[serde(default = "default_fuel_swing")]
    pub fuel_shock_swing: f64,
    #[serde(default = "default_fault_chance")]
    pub fault_chance: f64,
    #[serde(default = "default_grounding_hours")]
    pub grounding_hours: f64,
    #[serde(default = "default_strike_chance")]
    pub strike_chance: f64,
    #[serde(default = "default_strike_min")]
    pub strike_impact_min: f64,
    #[serde(default = "default_strike_max")]
    pub strike_impact_max: f64,
}

fn default_positive_chance() -> f64 {
    0.15
}
fn default_positive_min() -> f64 {
    1.5
}
fn default_positive_max() -> f64 {
    2.0
}
fn default_weather_chance() -> f64 {
    0.10
}
fn default_weather_prob_min() -> f64 {
    0.3
}
fn default_weather_prob_max() -> f64 {
    0.8
}
fn default_weather_delay_min() -> f64 {
    0.5
}
fn default_weather_delay_max() -> f64 {
    2.0
}
fn default_fuel_chance() -> f64 {
    0.25
}
fn default_fuel_swing() -> f64 {
    0.20
}
fn default_fault_chance() -> f64 {
    0.05
}
fn default_grounding_hours() -> f64 {
    24.0
}
fn default_strike_chance() -> f64 {
    0.03
}
fn default_strike_min() -> f64 {
    0.3
}
fn default_strike_max() -> f64 {
    0.7
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            positive_event_chance: default_positive_chance(),
            positive_multiplier_min: default_positive_min(),
            positive_multiplier_max: default_positive_max(),
            weather_warning_chance: default_weather_chance(),
            weather_probability_min: default_weather_prob_min(),
            weather_probability_max: default_weather_prob_max(),
            weather_delay_min: default_weather_delay_min(),
            weather_delay_max: default_weather_delay_max(),
            fuel_shock_chance: default_fuel_chance(),
            fuel_shock_swing: default_fuel_swing(),
            fault_chance: default_fault_chance(),
            grounding_hours: default_grounding_hours(),
            strike_chance: default_strike_chance(),
            strike_impact_min: default_strike_min(),
            strike_impact_max: default_strike_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_attempts")]
    pub attempts: usize,
    /// Attempts before this index always take the best candidate.
    #[serde(default = "default_greedy_attempts")]
    pub greedy_attempts: usize,
    #[serde(default = "default_top_k")]
    pub top_candidates: usize,
    #[serde(default = "default_min_pool_share")]
    pub min_pool_share: f64,
    #[serde(default = "default_min_score")]
    pub min_leg_score: f64,
    #[serde(default = "default_weather_penalty")]
    pub weather_penalty: f64,
    #[serde(default = "default_load_factor")]
    pub competitor_load_factor: f64,
    #[serde(default = "default_fare_steps")]
    pub fare_steps: u32,
}

fn default_attempts() -> usize {
    25
}
fn default_greedy_attempts() -> usize {
    2
}
fn default_top_k() -> usize {
    3
}
fn default_min_pool_share() -> f64 {
    0.1
}
fn default_min_score() -> f64 {
    -1_000.0
}
fn default_weather_penalty() -> f64 {
    0.2
}
fn default_load_factor() -> f64 {
    0.7
}
fn default_fare_steps() -> u32 {
    40
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            greedy_attempts: default_greedy_attempts(),
            top_candidates: default_top_k(),
            min_pool_share: default_min_pool_share(),
            min_leg_score: default_min_score(),
            weather_penalty: default_weather_penalty(),
            competitor_load_factor: default_load_factor(),
            fare_steps: default_fare_steps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Aircraft type used for AI schedule timing and capacity.
    #[serde(default = "default_reference_type")]
    pub reference_type: String,
    #[serde(default = "default_legs_per_aircraft")]
    pub legs_per_aircraft: usize,
    #[serde(default = "default_start_jitter")]
    pub start_jitter_hours: f64,
    #[serde(default = "default_satisfaction_min")]
    pub satisfaction_min: f64,
    #[serde(default = "default_satisfaction_max")]
    pub satisfaction_max: f64,
    #[serde(default = "default_hub_satisfaction")]
    pub hub_satisfaction_bonus: f64,
    #[serde(default = "default_max_traffic")]
    pub max_traffic: usize,
    #[serde(default = "default_spawn_chance")]
    pub spawn_chance: f64,
}

fn default_reference_type() -> String {
    "A320".to_string()
}
fn default_legs_per_aircraft() -> usize {
    8
}
fn default_start_jitter() -> f64 {
    2.0
}
fn default_satisfaction_min() -> f64 {
    40.0
}
fn default_satisfaction_max() -> f64 {
    60.0
}
fn default_hub_satisfaction() -> f64 {
    10.0
}
fn default_max_traffic() -> usize {
    80
}
fn default_spawn_chance() -> f64 {
    0.1
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            reference_type: default_reference_type(),
            legs_per_aircraft: default_legs_per_aircraft(),
            start_jitter_hours: default_start_jitter(),
            satisfaction_min: default_satisfaction_min(),
            satisfaction_max: default_satisfaction_max(),
            hub_satisfaction_bonus: default_hub_satisfaction(),
            max_traffic: default_max_traffic(),
            spawn_chance: default_spawn_chance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: SimConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.schedule.horizon_hours, 26.0);
        assert_eq!(config.economy.revenue_per_passenger_mile, 0.22);
        assert_eq!(config.planner.attempts, 25);
        assert_eq!(config.ai.reference_type, "A320");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: SimConfig =
            serde_yaml::from_str("economy:\n  campaign_cost: 10.0\n").unwrap();
        assert_eq!(config.economy.campaign_cost, 10.0);
        assert_eq!(config.economy.campaign_boost, 1.25);
    }

    #[test]
    fn turnaround_depends_on_leg_length() {
        let schedule = ScheduleConfig::default();
        assert!((schedule.turnaround_hours(1.0) - 0.5).abs() < 1e-12);
        assert!((schedule.turnaround_hours(2.5) - 50.0 / 60.0).abs() < 1e-12);
    }
}
