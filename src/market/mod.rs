//! Demand, pricing, competition and scheduling models.

pub mod competitors;
pub mod demand;
pub mod economics;
pub mod planner;
