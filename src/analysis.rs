//! Read-only queries over the world: what a scheduled leg is expected to earn
//! today, and the report that closes each week.

use std::{cmp::Ordering, collections::BTreeMap};

use serde::Serialize;

use crate::{
    error::SimError,
    market::{
        demand::{self, EventSource},
        economics::{self, LegTerms},
    },
    world::{
        CostBreakdown, DailyPnl, RouteProfit, RouteSatisfaction, TimeBucket, UnservedSummary,
        WeeklyReport, World,
    },
};

const HOURS_PER_WEEK: f64 = 168.0;
const TOP_ROUTES: usize = 10;

/// Projection of one scheduled leg against today's market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegAnalysis {
    pub aircraft_id: String,
    pub leg_index: usize,
    pub route_key: String,
    pub departure: f64,
    pub arrival: f64,
    pub fare: f64,
    pub pool: u32,
    pub competitors: usize,
    pub competing_capacity: u32,
    pub saturated: bool,
    pub passengers: u32,
    pub load_factor: f64,
    pub revenue: f64,
    pub cost: CostBreakdown,
    pub profit: f64,
    pub satisfaction_delta: f64,
}

pub fn analyze_leg(world: &World, aircraft_id: &str, leg_index: usize) -> Result<LegAnalysis, SimError> {
    let config = world.config();
    let aircraft = world.aircraft(aircraft_id)?;
    let leg = aircraft.schedule.get(leg_index).ok_or_else(|| SimError::UnknownLeg {
        aircraft: aircraft_id.to_string(),
        index: leg_index,
    })?;
    let terms = LegTerms::for_leg(world, aircraft, &leg.origin, &leg.destination, leg.duration)?;
    let route = world.route(&leg.origin, &leg.destination)?;
    let pool = demand::passenger_pool(
        world,
        route,
        terms.capacity,
        TimeBucket::from_hour(leg.departure),
        EventSource::Daily,
    )?;
    let rivals = demand::competitors(world, aircraft_id, &leg.origin, &leg.destination, leg.departure)?;

    let key = leg.route_key();
    let satisfaction = world
        .route_stats()
        .satisfaction_or(&key, config.economy.default_satisfaction);
    let own_score = demand::competitive_score(satisfaction, aircraft.upgrades.count(), leg.fare, &config.economy);
    let factor = demand::fare_effect(leg.fare, &config.economy) * demand::crew_bonus(world, aircraft_id);
    let allocation = demand::allocate(pool, terms.capacity, own_score, &rivals, factor);
    let money = terms.financials(allocation.boarded, leg.fare);

    Ok(LegAnalysis {
        aircraft_id: aircraft_id.to_string(),
        leg_index,
        route_key: key,
        departure: leg.effective_departure(),
        arrival: leg.effective_arrival(),
        fare: leg.fare,
        pool,
        competitors: rivals.len(),
        competing_capacity: rivals.iter().fold(0u32, |sum, c| sum.saturating_add(c.capacity)),
        saturated: allocation.saturated,
        passengers: allocation.boarded,
        load_factor: if terms.capacity > 0 {
            f64::from(allocation.boarded) / f64::from(terms.capacity)
        } else {
            0.0
        },
        revenue: money.revenue,
        cost: money.cost,
        profit: money.profit,
        satisfaction_delta: economics::satisfaction_delta(
            leg.fare,
            &aircraft.upgrades,
            world.difficulty(),
            &config.economy,
        ),
    })
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Summarises `week` from flight history, the daily ledger and the unserved
/// opportunities collected since the week opened.
pub fn weekly_report(world: &World, week: u32) -> WeeklyReport {
    let start = f64::from(week.saturating_sub(1)) * HOURS_PER_WEEK;
    let end = start + HOURS_PER_WEEK;

    let mut by_route: BTreeMap<String, f64> = BTreeMap::new();
    for record in world
        .player_fleet()
        .flat_map(|ac| ac.history.iter())
        .filter(|r| r.timestamp >= start && r.timestamp < end)
    {
        *by_route
            .entry(format!("{}-{}", record.origin, record.destination))
            .or_insert(0.0) += record.profit;
    }
    let mut top_routes: Vec<RouteProfit> = by_route
        .into_iter()
        .map(|(route_key, profit)| RouteProfit { route_key, profit })
        .collect();
    top_routes.sort_by(|a, b| descending(a.profit, b.profit));
    top_routes.truncate(TOP_ROUTES);

    let daily_pnl = world
        .ledger()
        .daily_pnl
        .iter()
        .map(|(&day, &pnl)| DailyPnl { day, pnl })
        .collect();

    let mut unserved: BTreeMap<&str, UnservedSummary> = BTreeMap::new();
    for missed in &world.ledger().unserved {
        let entry = unserved
            .entry(missed.route_key.as_str())
            .or_insert_with(|| UnservedSummary {
                route_key: missed.route_key.clone(),
                passengers_missed: 0,
                potential_revenue: 0.0,
                occurrences: 0,
                aircraft_type: missed.aircraft_type.clone(),
            });
        entry.passengers_missed = entry.passengers_missed.saturating_add(missed.passengers_missed);
        entry.potential_revenue += missed.potential_revenue;
        entry.occurrences += 1;
    }
    let mut unserved: Vec<UnservedSummary> = unserved.into_values().collect();
    unserved.sort_by(|a, b| descending(a.potential_revenue, b.potential_revenue));

    let mut satisfaction: Vec<RouteSatisfaction> = world
        .route_stats()
        .iter()
        .map(|(key, stats)| RouteSatisfaction {
            route_key: key.clone(),
            satisfaction: stats.satisfaction,
        })
        .collect();
    satisfaction.sort_by(|a, b| descending(a.satisfaction, b.satisfaction));

    WeeklyReport {
        week,
        top_routes,
        daily_pnl,
        unserved,
        satisfaction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_support,
        world::{CompletedFlightLeg, UnservedOpportunity},
    };

    fn record(origin: &str, destination: &str, profit: f64, timestamp: f64) -> CompletedFlightLeg {
        CompletedFlightLeg {
            origin: origin.into(),
            destination: destination.into(),
            miles: 200.0,
            passengers: 100,
            revenue: profit.max(0.0),
            cost: 0.0,
            profit,
            timestamp,
            breakdown: CostBreakdown::default(),
        }
    }

    #[test]
    fn leg_analysis_prices_the_scheduled_leg() {
        let mut world = test_support::tiny_world();
        world.assign_leg("PL-1", "LHR", "CDG").unwrap();
        let analysis = analyze_leg(&world, "PL-1", 0).unwrap();
        assert_eq!(analysis.route_key, "LHR-CDG");
        assert_eq!(analysis.competitors, 0);
        assert_eq!(analysis.pool, 75);
        assert!(analysis.saturated);
        assert!(analysis.passengers <= analysis.pool);
        assert!((analysis.profit - (analysis.revenue - analysis.cost.total)).abs() < 1e-6);
        assert!(matches!(
            analyze_leg(&world, "PL-1", 3),
            Err(SimError::UnknownLeg { index: 3, .. })
        ));
    }

    #[test]
    fn report_only_counts_the_requested_week() {
        let mut world = test_support::tiny_world();
        let history = &mut world.aircraft_mut("PL-1").unwrap().history;
        history.push(record("LHR", "CDG", 1_000.0, 10.0));
        history.push(record("LHR", "CDG", 500.0, 30.0));
        history.push(record("CDG", "LHR", 4_000.0, 50.0));
        history.push(record("LHR", "AMS", 9_000.0, 200.0));
        world.ledger.book(1, 1_500.0);
        world.ledger.book(2, -200.0);

        let report = weekly_report(&world, 1);
        assert_eq!(
            report.top_routes,
            vec![
                RouteProfit { route_key: "CDG-LHR".into(), profit: 4_000.0 },
                RouteProfit { route_key: "LHR-CDG".into(), profit: 1_500.0 },
            ]
        );
        assert_eq!(report.daily_pnl.len(), 2);
        assert_eq!(report.daily_pnl[1], DailyPnl { day: 2, pnl: -200.0 });
    }

    #[test]
    fn unserved_opportunities_are_grouped_by_route() {
        let mut world = test_support::tiny_world();
        for (route, missed) in [("LHR-CDG", 10), ("LHR-AMS", 50), ("LHR-CDG", 5)] {
            world.ledger.unserved.push(UnservedOpportunity {
                route_key: route.into(),
                passengers_missed: missed,
                potential_revenue: f64::from(missed) * 40.0,
                aircraft_type: "A320".into(),
            });
        }
        world.route_stats.record("LHR-CDG", 5.0, 1, 50.0);
        world.route_stats.record("LHR-AMS", -5.0, 1, 50.0);

        let report = weekly_report(&world, 1);
        assert_eq!(report.unserved.len(), 2);
        assert_eq!(report.unserved[0].route_key, "LHR-AMS");
        assert_eq!(report.unserved[1].passengers_missed, 15);
        assert_eq!(report.unserved[1].occurrences, 2);
        assert_eq!(report.satisfaction[0].route_key, "LHR-CDG");
        assert_eq!(report.satisfaction[0].satisfaction, 55.0);
    }
}
